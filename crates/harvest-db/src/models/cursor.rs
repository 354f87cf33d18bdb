//! Channel cursor database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for channel_cursors table
#[derive(Debug, Clone, FromRow)]
pub struct CursorModel {
    pub channel_id: i64,
    pub channel_name: String,
    pub last_message_id: i64,
    pub last_polled_at: DateTime<Utc>,
}
