//! Error handling utilities for repositories

use harvest_core::error::DomainError;
use harvest_core::value_objects::ChannelId;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    DomainError::DatabaseError(e.to_string())
}

/// Create a "cursor not found" error
pub fn cursor_not_found(id: ChannelId) -> DomainError {
    DomainError::CursorNotFound(id)
}

/// Create a "cursor exists" error
pub fn cursor_exists(id: ChannelId) -> DomainError {
    DomainError::CursorExists(id)
}
