//! Post, message, and attachment database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for posts table
#[derive(Debug, Clone, FromRow)]
pub struct PostModel {
    pub id: i64,
    pub channel_id: i64,
    pub channel_name: String,
    pub group_id: i64,
    pub first_message_id: i64,
    pub combined_text: String,
    pub posted_at: DateTime<Utc>,
    pub ingested_at: DateTime<Utc>,
    pub message_link: Option<String>,
}

/// Database model for post_messages table
#[derive(Debug, Clone, FromRow)]
pub struct PostMessageModel {
    pub message_id: i64,
    pub text: String,
}

/// Database model for media_attachments table
#[derive(Clone, FromRow)]
pub struct MediaAttachmentModel {
    pub kind: String,
    pub file_id: String,
    pub mime_type: Option<String>,
    pub file_size: i64,
    pub payload: Vec<u8>,
}

/// Attachment count per (post, kind)
#[derive(Debug, Clone, FromRow)]
pub struct PostMediaCountModel {
    pub post_id: i64,
    pub kind: String,
    pub count: i64,
}

/// Attachment count per kind
#[derive(Debug, Clone, FromRow)]
pub struct MediaKindCountModel {
    pub kind: String,
    pub count: i64,
}

/// Row counts across the post tables
#[derive(Debug, Clone, FromRow)]
pub struct PostStatsModel {
    pub posts: i64,
    pub messages: i64,
    pub attachments: i64,
}
