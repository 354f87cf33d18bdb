//! Message range queries against a source

use serde::{Deserialize, Serialize};

use super::message::SourceMessage;
use crate::value_objects::MessageId;

/// Range of messages to fetch from a channel
///
/// Both bounds are exclusive. When a `limit` is set the kept messages are
/// the ones closest to the anchor: `max_id` when present, otherwise
/// `min_id`, otherwise the newest. Results always come back newest-first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRange {
    pub min_id: Option<MessageId>,
    pub max_id: Option<MessageId>,
    pub limit: Option<u32>,
}

impl MessageRange {
    /// The `limit` most recent messages
    pub fn latest(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Up to `limit` messages immediately preceding `id`
    pub fn before(id: MessageId, limit: u32) -> Self {
        Self {
            max_id: Some(id),
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Up to `limit` messages immediately following `id`
    pub fn after(id: MessageId, limit: u32) -> Self {
        Self {
            min_id: Some(id),
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Every message with `after < id <= up_to`
    pub fn between(after: MessageId, up_to: MessageId) -> Self {
        Self {
            min_id: Some(after),
            max_id: Some(up_to.next()),
            limit: None,
        }
    }

    /// Check whether `id` falls strictly inside the bounds
    pub fn contains(&self, id: MessageId) -> bool {
        self.min_id.map_or(true, |min| id > min) && self.max_id.map_or(true, |max| id < max)
    }

    /// Apply this range to an in-memory message list
    ///
    /// Reference behaviour for sources that hold messages locally.
    pub fn select<'a, I>(&self, messages: I) -> Vec<SourceMessage>
    where
        I: IntoIterator<Item = &'a SourceMessage>,
    {
        let mut matching: Vec<SourceMessage> = messages
            .into_iter()
            .filter(|message| self.contains(message.id))
            .cloned()
            .collect();

        if self.max_id.is_none() && self.min_id.is_some() {
            // Anchored at the lower bound: keep the lowest ids
            matching.sort_by_key(|message| message.id);
            if let Some(limit) = self.limit {
                matching.truncate(limit as usize);
            }
            matching.reverse();
        } else {
            matching.sort_by_key(|message| std::cmp::Reverse(message.id));
            if let Some(limit) = self.limit {
                matching.truncate(limit as usize);
            }
        }

        matching
    }
}
