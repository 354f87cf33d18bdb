//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{ChannelCursor, MediaAttachment, MediaKind, NewPost, Post, PostId, PostMessage};
use crate::error::DomainError;
use crate::value_objects::{ChannelId, MessageId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Cursor Repository
// ============================================================================

#[async_trait]
pub trait CursorRepository: Send + Sync {
    /// Find the cursor of a channel
    async fn find(&self, channel_id: ChannelId) -> RepoResult<Option<ChannelCursor>>;

    /// Create the cursor of a previously unseen channel
    async fn create(&self, cursor: &ChannelCursor) -> RepoResult<()>;

    /// Move the cursor forward; returns false when `to` is not beyond it
    async fn advance(
        &self,
        channel_id: ChannelId,
        to: MessageId,
        at: DateTime<Utc>,
    ) -> RepoResult<bool>;

    /// List every cursor, by channel name
    async fn list(&self) -> RepoResult<Vec<ChannelCursor>>;

    /// Remove every cursor
    async fn delete_all(&self) -> RepoResult<u64>;
}

// ============================================================================
// Post Repository
// ============================================================================

/// Post together with its attachment breakdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSummary {
    pub post: Post,
    pub media_counts: Vec<(MediaKind, i64)>,
}

impl PostSummary {
    /// Total attachments owned by the post
    pub fn media_total(&self) -> i64 {
        self.media_counts.iter().map(|(_, count)| count).sum()
    }
}

/// Row counts across the post tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostStats {
    pub posts: i64,
    pub messages: i64,
    pub attachments: i64,
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Persist a post with its messages and attachments in one transaction
    ///
    /// Returns `None` when the channel already holds a post starting at the
    /// same first message; nothing is written in that case.
    async fn insert_group(
        &self,
        post: &NewPost,
        messages: &[PostMessage],
        media: &[MediaAttachment],
    ) -> RepoResult<Option<PostId>>;

    /// Find post by ID
    async fn find_by_id(&self, id: PostId) -> RepoResult<Option<Post>>;

    /// Messages of a post, by message id
    async fn find_messages(&self, post_id: PostId) -> RepoResult<Vec<PostMessage>>;

    /// Attachments of a post
    async fn find_media(&self, post_id: PostId) -> RepoResult<Vec<MediaAttachment>>;

    /// Delete one post and everything it owns
    async fn delete(&self, id: PostId) -> RepoResult<bool>;

    /// Delete every post ingested strictly before `cutoff`
    async fn delete_ingested_before(&self, cutoff: DateTime<Utc>) -> RepoResult<u64>;

    /// Delete every post
    async fn delete_all(&self) -> RepoResult<u64>;

    /// Most recently ingested posts with their media breakdown
    async fn recent(&self, limit: i64) -> RepoResult<Vec<PostSummary>>;

    /// Row counts
    async fn stats(&self) -> RepoResult<PostStats>;

    /// Attachment count per kind
    async fn media_kind_counts(&self) -> RepoResult<Vec<(MediaKind, i64)>>;
}
