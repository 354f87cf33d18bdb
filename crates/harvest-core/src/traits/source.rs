//! Message source trait - the read side of an external channel network

use async_trait::async_trait;

use crate::error::DomainError;
use crate::source::{MessageRange, SourceChannel, SourceMessage};

/// Result type for message source operations
pub type SourceResult<T> = Result<T, DomainError>;

/// Read access to channels on the message network
///
/// Every call is fallible and retryless; pacing and retry belong to the
/// caller.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Resolve a channel by username, link, or title
    async fn resolve_channel(&self, name: &str) -> SourceResult<SourceChannel>;

    /// Fetch messages in `range`, newest-first
    async fn fetch_messages(
        &self,
        channel: &SourceChannel,
        range: MessageRange,
    ) -> SourceResult<Vec<SourceMessage>>;

    /// Download the attachment carried by `message`
    async fn download_media(
        &self,
        channel: &SourceChannel,
        message: &SourceMessage,
    ) -> SourceResult<Vec<u8>>;

    /// The `limit` most recent messages, newest-first
    async fn latest_messages(
        &self,
        channel: &SourceChannel,
        limit: u32,
    ) -> SourceResult<Vec<SourceMessage>> {
        self.fetch_messages(channel, MessageRange::latest(limit)).await
    }
}
