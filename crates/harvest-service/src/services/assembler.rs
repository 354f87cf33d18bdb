//! Group assembler
//!
//! Rebuilds one logical post from its seed message. A post split across
//! several raw messages shares a group marker; siblings are looked up in a
//! bounded window on both sides of the seed, so a group wider than the
//! window is only partially recovered.

use std::collections::BTreeMap;

use harvest_core::source::{MessageRange, SourceChannel, SourceMessage};
use harvest_core::value_objects::{GroupKey, MessageId};
use tracing::{debug, instrument, warn};

use super::context::ServiceContext;

/// Messages of one logical post, ascending by id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledGroup {
    pub key: GroupKey,
    pub messages: Vec<SourceMessage>,
    pub min_id: MessageId,
    pub max_id: MessageId,
}

impl AssembledGroup {
    fn from_members(key: GroupKey, members: BTreeMap<MessageId, SourceMessage>) -> Self {
        let messages: Vec<SourceMessage> = members.into_values().collect();
        // Callers always insert the seed, so the group is never empty
        let min_id = messages.first().map_or_else(MessageId::default, |m| m.id);
        let max_id = messages.last().map_or(min_id, |m| m.id);
        Self {
            key,
            messages,
            min_id,
            max_id,
        }
    }

    /// Group made of the seed alone
    pub fn singleton(seed: &SourceMessage) -> Self {
        Self {
            key: seed.group_key(),
            messages: vec![seed.clone()],
            min_id: seed.id,
            max_id: seed.id,
        }
    }

    /// Earliest message, which dates and links the post
    pub fn first(&self) -> &SourceMessage {
        &self.messages[0]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Group assembler
pub struct GroupAssembler<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> GroupAssembler<'a> {
    /// Create a new GroupAssembler
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Collect every sibling of `seed` visible within the window
    ///
    /// Never fails: a window the source cannot serve degrades the group
    /// toward the seed alone.
    #[instrument(skip(self, channel, seed), fields(channel_id = %channel.id, message_id = %seed.id))]
    pub async fn assemble(&self, channel: &SourceChannel, seed: &SourceMessage) -> AssembledGroup {
        let Some(marker) = seed.grouped_id else {
            return AssembledGroup::singleton(seed);
        };

        let window = self.ctx.settings().group_window;
        let mut members = BTreeMap::new();
        members.insert(seed.id, seed.clone());

        for range in [
            MessageRange::before(seed.id, window),
            MessageRange::after(seed.id, window),
        ] {
            match self.ctx.source().fetch_messages(channel, range).await {
                Ok(messages) => {
                    for message in messages {
                        if message.grouped_id == Some(marker) {
                            members.entry(message.id).or_insert(message);
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, group_key = marker, "Sibling window unavailable");
                }
            }
        }

        if members.len() == 1 {
            debug!(group_key = marker, "No siblings found in window");
        }

        AssembledGroup::from_members(GroupKey::Marker(marker), members)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::services::context::HarvestSettings;
    use crate::services::testing::{photo, text, Harness};

    fn ids(group: &AssembledGroup) -> Vec<i64> {
        group.messages.iter().map(|m| m.id.into_inner()).collect()
    }

    #[tokio::test]
    async fn test_ungrouped_seed_is_singleton_without_fetching() {
        let h = Harness::new();
        let channel = h.source.add_channel("flats", 1, Some("flats"));
        let seed = photo(10, None, "one room", 200);
        h.source.push(1, seed.clone());

        let group = GroupAssembler::new(&h.ctx).assemble(&channel, &seed).await;

        assert_eq!(ids(&group), vec![10]);
        assert_eq!(group.key, GroupKey::Single(MessageId::new(10)));
        assert_eq!(group.min_id, group.max_id);
        assert_eq!(h.source.window_fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_siblings_collected_on_both_sides() {
        let h = Harness::new();
        let channel = h.source.add_channel("flats", 1, None);
        h.source.push(1, text(1, None, "unrelated"));
        h.source.push(1, text(2, Some(100), "Part 1"));
        h.source.push(1, text(3, Some(100), "Part 2"));
        h.source.push(1, text(4, Some(100), "Part 3"));
        h.source.push(1, text(5, Some(200), "other group"));

        let seed = text(3, Some(100), "Part 2");
        let group = GroupAssembler::new(&h.ctx).assemble(&channel, &seed).await;

        assert_eq!(ids(&group), vec![2, 3, 4]);
        assert_eq!(group.key, GroupKey::Marker(100));
        assert_eq!(group.min_id, MessageId::new(2));
        assert_eq!(group.max_id, MessageId::new(4));
        assert_eq!(group.first().text, "Part 1");
    }

    #[tokio::test]
    async fn test_window_bounds_sibling_search() {
        let h = Harness::with_settings(HarvestSettings {
            group_window: 2,
            ..HarvestSettings::default()
        });
        let channel = h.source.add_channel("flats", 1, None);
        for id in 1..=9 {
            h.source.push(1, text(id, Some(7), "part"));
        }

        let seed = text(5, Some(7), "part");
        let group = GroupAssembler::new(&h.ctx).assemble(&channel, &seed).await;

        assert_eq!(ids(&group), vec![3, 4, 5, 6, 7]);
    }

    #[tokio::test]
    async fn test_failed_window_falls_back_to_seed() {
        let h = Harness::new();
        let channel = h.source.add_channel("flats", 1, None);
        h.source.push(1, text(2, Some(100), "Part 1"));
        h.source.push(1, text(3, Some(100), "Part 2"));
        h.source.fail_windows.store(true, Ordering::SeqCst);

        let seed = text(3, Some(100), "Part 2");
        let group = GroupAssembler::new(&h.ctx).assemble(&channel, &seed).await;

        assert_eq!(ids(&group), vec![3]);
        assert_eq!(group.key, GroupKey::Marker(100));
    }
}
