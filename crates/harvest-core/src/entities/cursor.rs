//! Channel cursor entity - per-channel resumption state

use chrono::{DateTime, Utc};

use crate::value_objects::{ChannelId, MessageId};

/// Highest fully-processed message of one channel
///
/// The cursor is the only record of what has been processed: a group that
/// carried no media advances it without ever producing a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelCursor {
    pub channel_id: ChannelId,
    pub channel_name: String,
    pub last_message_id: MessageId,
    pub last_polled_at: DateTime<Utc>,
}

impl ChannelCursor {
    /// Create a cursor seeded at the given message
    pub fn new(channel_id: ChannelId, channel_name: impl Into<String>, seed: MessageId) -> Self {
        Self {
            channel_id,
            channel_name: channel_name.into(),
            last_message_id: seed,
            last_polled_at: Utc::now(),
        }
    }

    /// Whether moving to `candidate` would advance the cursor
    #[inline]
    pub fn would_advance(&self, candidate: MessageId) -> bool {
        candidate > self.last_message_id
    }

    /// Advance in place; ids at or below the current position are ignored
    pub fn advance(&mut self, to: MessageId, at: DateTime<Utc>) -> bool {
        if !self.would_advance(to) {
            return false;
        }
        self.last_message_id = to;
        self.last_polled_at = at;
        true
    }
}
