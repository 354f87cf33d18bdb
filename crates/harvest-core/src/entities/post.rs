//! Post entity - one reconstructed multi-message post

use chrono::{DateTime, Utc};

use crate::value_objects::{ChannelId, MessageId};

/// Surrogate key of a persisted post
pub type PostId = i64;

/// Post ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub channel_id: ChannelId,
    pub channel_name: String,
    /// Source group marker, or the seed message id for ungrouped posts
    pub group_id: i64,
    pub first_message_id: MessageId,
    pub combined_text: String,
    pub posted_at: DateTime<Utc>,
    pub ingested_at: DateTime<Utc>,
    pub message_link: Option<String>,
}

/// Persisted post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub channel_id: ChannelId,
    pub channel_name: String,
    pub group_id: i64,
    pub first_message_id: MessageId,
    pub combined_text: String,
    pub posted_at: DateTime<Utc>,
    pub ingested_at: DateTime<Utc>,
    pub message_link: Option<String>,
}

impl Post {
    /// Get a truncated preview of the text
    pub fn preview(&self, max_len: usize) -> &str {
        if self.combined_text.len() <= max_len {
            &self.combined_text
        } else {
            let mut end = max_len;
            while !self.combined_text.is_char_boundary(end) && end > 0 {
                end -= 1;
            }
            &self.combined_text[..end]
        }
    }
}

/// Raw message owned by a post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostMessage {
    pub message_id: MessageId,
    pub text: String,
}

/// Join message texts in source order, skipping empty captions
pub fn combine_text<'a, I>(texts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    texts
        .into_iter()
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Public link to the first message of a post
///
/// Channels without a username are only reachable through the private
/// `/c/` form.
pub fn message_link(
    channel_id: ChannelId,
    username: Option<&str>,
    first_message_id: MessageId,
) -> String {
    match username.filter(|name| !name.is_empty()) {
        Some(username) => format!("https://t.me/{username}/{first_message_id}"),
        None => format!("https://t.me/c/{channel_id}/{first_message_id}"),
    }
}
