//! Post writer
//!
//! Turns an assembled group into a persisted post. Only groups that end up
//! with at least one downloaded attachment are stored.

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use harvest_core::entities::{
    combine_text, message_link, MediaAttachment, NewPost, PostId, PostMessage,
};
use harvest_core::source::SourceChannel;
use harvest_core::value_objects::MessageId;
use harvest_core::classify;

use super::assembler::AssembledGroup;
use super::context::ServiceContext;
use super::error::ServiceResult;

/// What became of one group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Post committed with `media` attachments
    Persisted {
        post_id: PostId,
        max_id: MessageId,
        media: usize,
    },
    /// Group carried no attachments; nothing written
    NoMedia { max_id: MessageId },
    /// Every attachment failed to download; nothing written
    MediaUnavailable { max_id: MessageId, failed: usize },
    /// The channel already holds a post starting at this group's first message
    AlreadyStored { max_id: MessageId },
}

impl WriteOutcome {
    /// Highest message id of the group, whatever the outcome
    pub fn max_id(&self) -> MessageId {
        match *self {
            Self::Persisted { max_id, .. }
            | Self::NoMedia { max_id }
            | Self::MediaUnavailable { max_id, .. }
            | Self::AlreadyStored { max_id } => max_id,
        }
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted { .. })
    }
}

/// Post writer
pub struct PostWriter<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PostWriter<'a> {
    /// Create a new PostWriter
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Classify, download, and persist `group` in one transaction
    ///
    /// A failed download drops that attachment only. When every candidate
    /// fails the group is discarded like one without media.
    ///
    /// # Errors
    /// Fails only when the post cannot be persisted.
    #[instrument(
        skip(self, channel, group),
        fields(channel_id = %channel.id, group_key = %group.key, messages = group.len())
    )]
    pub async fn write(
        &self,
        channel: &SourceChannel,
        group: &AssembledGroup,
    ) -> ServiceResult<WriteOutcome> {
        let (media, failed) = self.download_attachments(channel, group).await;
        if media.is_empty() {
            if failed > 0 {
                warn!(failed, "No attachment could be downloaded, group discarded");
                return Ok(WriteOutcome::MediaUnavailable {
                    max_id: group.max_id,
                    failed,
                });
            }
            debug!("Group has no media, discarded");
            return Ok(WriteOutcome::NoMedia {
                max_id: group.max_id,
            });
        }

        let first = group.first();
        let post = NewPost {
            channel_id: channel.id,
            channel_name: channel.display_name().to_string(),
            group_id: group.key.storage_value(),
            first_message_id: group.min_id,
            combined_text: combine_text(group.messages.iter().map(|m| m.text.as_str())),
            posted_at: first.date,
            ingested_at: Utc::now(),
            message_link: Some(message_link(
                channel.id,
                channel.username.as_deref(),
                group.min_id,
            )),
        };
        let messages: Vec<PostMessage> = group
            .messages
            .iter()
            .map(|m| PostMessage {
                message_id: m.id,
                text: m.text.clone(),
            })
            .collect();

        match self
            .ctx
            .post_repo()
            .insert_group(&post, &messages, &media)
            .await?
        {
            Some(post_id) => {
                info!(post_id, media = media.len(), "Post stored");
                Ok(WriteOutcome::Persisted {
                    post_id,
                    max_id: group.max_id,
                    media: media.len(),
                })
            }
            None => {
                debug!(first_message_id = %group.min_id, "Post already stored");
                Ok(WriteOutcome::AlreadyStored {
                    max_id: group.max_id,
                })
            }
        }
    }

    async fn download_attachments(
        &self,
        channel: &SourceChannel,
        group: &AssembledGroup,
    ) -> (Vec<MediaAttachment>, usize) {
        let mut attachments = Vec::new();
        let mut failed = 0usize;

        for message in &group.messages {
            let Some(descriptor) = &message.media else {
                continue;
            };
            let info = classify(message.id, descriptor);

            match self.ctx.source().download_media(channel, message).await {
                Ok(payload) => attachments.push(MediaAttachment::new(info, payload)),
                Err(e) => {
                    warn!(message_id = %message.id, kind = %info.kind, error = %e, "Attachment download failed");
                    failed += 1;
                }
            }
        }

        (attachments, failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::assembler::GroupAssembler;
    use crate::services::testing::{document, photo, text, Harness};
    use harvest_core::entities::MediaKind;

    #[tokio::test]
    async fn test_single_photo_persisted() {
        let h = Harness::new();
        let channel = h.source.add_channel("flats", 1, Some("flats"));
        let seed = photo(10, None, "one room", 200);

        let group = AssembledGroup::singleton(&seed);
        let outcome = PostWriter::new(&h.ctx).write(&channel, &group).await.unwrap();

        assert!(outcome.is_persisted());
        assert_eq!(outcome.max_id(), MessageId::new(10));

        let stored = h.posts.all();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].post.first_message_id, MessageId::new(10));
        assert_eq!(stored[0].post.group_id, 10);
        assert_eq!(
            stored[0].post.message_link.as_deref(),
            Some("https://t.me/flats/10")
        );
        assert_eq!(stored[0].media.len(), 1);
        assert_eq!(stored[0].media[0].kind, MediaKind::Photo);
        assert_eq!(stored[0].media[0].file_size, 200);
        assert_eq!(stored[0].media[0].payload, b"payload-10".to_vec());
    }

    #[tokio::test]
    async fn test_grouped_text_is_combined_in_order() {
        let h = Harness::new();
        let channel = h.source.add_channel("flats", 1, None);
        h.source.push(1, text(1, Some(100), "Part 1"));
        h.source.push(1, document(2, Some(100), "Part 2"));
        h.source.push(1, text(3, Some(100), "Part 3"));

        let group = GroupAssembler::new(&h.ctx)
            .assemble(&channel, &text(1, Some(100), "Part 1"))
            .await;
        let outcome = PostWriter::new(&h.ctx).write(&channel, &group).await.unwrap();

        assert_eq!(outcome.max_id(), MessageId::new(3));
        let stored = h.posts.all();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].post.combined_text, "Part 1\nPart 2\nPart 3");
        assert_eq!(stored[0].post.first_message_id, MessageId::new(1));
        assert_eq!(stored[0].post.group_id, 100);
        assert_eq!(
            stored[0].post.message_link.as_deref(),
            Some("https://t.me/c/1/1")
        );
        assert_eq!(stored[0].messages.len(), 3);
        assert_eq!(stored[0].media.len(), 1);
        assert_eq!(stored[0].media[0].kind, MediaKind::Document);
    }

    #[tokio::test]
    async fn test_group_without_media_is_discarded() {
        let h = Harness::new();
        let channel = h.source.add_channel("flats", 1, None);
        for id in 1..=3 {
            h.source.push(1, text(id, Some(100), &format!("Part {id}")));
        }

        let group = GroupAssembler::new(&h.ctx)
            .assemble(&channel, &text(1, Some(100), "Part 1"))
            .await;
        assert_eq!(group.len(), 3);

        let outcome = PostWriter::new(&h.ctx).write(&channel, &group).await.unwrap();

        assert_eq!(
            outcome,
            WriteOutcome::NoMedia {
                max_id: MessageId::new(3)
            }
        );
        assert!(h.posts.all().is_empty());
    }

    #[tokio::test]
    async fn test_failed_download_drops_only_that_attachment() {
        let h = Harness::new();
        let channel = h.source.add_channel("flats", 1, None);
        h.source.push(1, photo(1, Some(5), "a", 10));
        h.source.push(1, photo(2, Some(5), "b", 20));
        h.source.fail_download(1);

        let group = GroupAssembler::new(&h.ctx)
            .assemble(&channel, &photo(1, Some(5), "a", 10))
            .await;
        let outcome = PostWriter::new(&h.ctx).write(&channel, &group).await.unwrap();

        assert!(outcome.is_persisted());
        let stored = h.posts.all();
        assert_eq!(stored[0].media.len(), 1);
        assert_eq!(stored[0].media[0].file_size, 20);
    }

    #[tokio::test]
    async fn test_only_candidate_failing_discards_group() {
        let h = Harness::new();
        let channel = h.source.add_channel("flats", 1, None);
        h.source.fail_download(4);

        let group = AssembledGroup::singleton(&photo(4, None, "x", 1));
        let outcome = PostWriter::new(&h.ctx).write(&channel, &group).await.unwrap();

        assert_eq!(
            outcome,
            WriteOutcome::MediaUnavailable {
                max_id: MessageId::new(4),
                failed: 1
            }
        );
        assert!(!outcome.is_persisted());
        assert!(h.posts.all().is_empty());
    }

    #[tokio::test]
    async fn test_rewrite_reports_already_stored() {
        let h = Harness::new();
        let channel = h.source.add_channel("flats", 1, None);
        let group = AssembledGroup::singleton(&photo(8, None, "x", 1));
        let writer = PostWriter::new(&h.ctx);

        assert!(writer.write(&channel, &group).await.unwrap().is_persisted());
        assert_eq!(
            writer.write(&channel, &group).await.unwrap(),
            WriteOutcome::AlreadyStored {
                max_id: MessageId::new(8)
            }
        );
        assert_eq!(h.posts.all().len(), 1);
    }
}
