//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::ChannelId;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    #[error("Cursor not found for channel {0}")]
    CursorNotFound(ChannelId),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Cursor already exists for channel {0}")]
    CursorExists(ChannelId),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Invalid media kind: {0}")]
    InvalidMediaKind(String),

    // =========================================================================
    // Message Source Errors
    // =========================================================================
    #[error("Message source error: {0}")]
    SourceError(String),

    #[error("Message source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Media download failed: {0}")]
    DownloadFailed(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for structured logs
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::ChannelNotFound(_) => "UNKNOWN_CHANNEL",
            Self::CursorNotFound(_) => "UNKNOWN_CURSOR",

            // Conflict
            Self::CursorExists(_) => "CURSOR_EXISTS",

            // Validation
            Self::InvalidMediaKind(_) => "INVALID_MEDIA_KIND",

            // Source
            Self::SourceError(_) => "SOURCE_ERROR",
            Self::SourceUnavailable(_) => "SOURCE_UNAVAILABLE",
            Self::DownloadFailed(_) => "DOWNLOAD_FAILED",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ChannelNotFound(_) | Self::CursorNotFound(_))
    }

    /// Check if retrying on a later pass may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::SourceError(_)
                | Self::SourceUnavailable(_)
                | Self::DownloadFailed(_)
                | Self::DatabaseError(_)
        )
    }
}
