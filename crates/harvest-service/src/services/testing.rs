//! In-memory repositories and message source for service tests

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use harvest_core::entities::{
    ChannelCursor, MediaAttachment, MediaKind, NewPost, Post, PostId, PostMessage,
};
use harvest_core::source::{MediaDescriptor, MessageRange, SourceChannel, SourceMessage};
use harvest_core::traits::{
    CursorRepository, MessageSource, PostRepository, PostStats, PostSummary, RepoResult,
    SourceResult,
};
use harvest_core::value_objects::{ChannelId, MessageId};
use harvest_core::DomainError;

use super::context::{HarvestSettings, ServiceContext};

// ============================================================================
// Message source
// ============================================================================

#[derive(Default)]
pub struct FakeSource {
    channels: Mutex<HashMap<String, SourceChannel>>,
    messages: Mutex<HashMap<ChannelId, Vec<SourceMessage>>>,
    failed_downloads: Mutex<HashSet<MessageId>>,
    pub fail_windows: AtomicBool,
    pub fail_ranges: AtomicBool,
    pub panic_on_resolve: AtomicBool,
    pub resolve_calls: Mutex<Vec<String>>,
    pub window_fetches: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a channel reachable under `name`
    pub fn add_channel(&self, name: &str, id: i64, username: Option<&str>) -> SourceChannel {
        let channel = SourceChannel {
            id: ChannelId::new(id),
            title: format!("{name} title"),
            username: username.map(String::from),
        };
        self.channels
            .lock()
            .unwrap()
            .insert(name.to_string(), channel.clone());
        self.messages.lock().unwrap().entry(channel.id).or_default();
        channel
    }

    pub fn push(&self, channel_id: i64, message: SourceMessage) {
        self.messages
            .lock()
            .unwrap()
            .entry(ChannelId::new(channel_id))
            .or_default()
            .push(message);
    }

    pub fn fail_download(&self, id: i64) {
        self.failed_downloads
            .lock()
            .unwrap()
            .insert(MessageId::new(id));
    }
}

#[async_trait]
impl MessageSource for FakeSource {
    async fn resolve_channel(&self, name: &str) -> SourceResult<SourceChannel> {
        assert!(
            !self.panic_on_resolve.load(Ordering::SeqCst),
            "source session lost"
        );
        self.resolve_calls.lock().unwrap().push(name.to_string());
        self.channels
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| DomainError::ChannelNotFound(name.to_string()))
    }

    async fn fetch_messages(
        &self,
        channel: &SourceChannel,
        range: MessageRange,
    ) -> SourceResult<Vec<SourceMessage>> {
        let is_window = range.limit.is_some() && (range.min_id.is_some() || range.max_id.is_some());
        if is_window {
            self.window_fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_windows.load(Ordering::SeqCst) {
                return Err(DomainError::SourceUnavailable("window".to_string()));
            }
        }
        if range.limit.is_none() && self.fail_ranges.load(Ordering::SeqCst) {
            return Err(DomainError::SourceError("flood wait".to_string()));
        }

        let messages = self.messages.lock().unwrap();
        let channel_messages = messages.get(&channel.id).map(Vec::as_slice).unwrap_or(&[]);
        Ok(range.select(channel_messages))
    }

    async fn download_media(
        &self,
        _channel: &SourceChannel,
        message: &SourceMessage,
    ) -> SourceResult<Vec<u8>> {
        if self.failed_downloads.lock().unwrap().contains(&message.id) {
            return Err(DomainError::DownloadFailed(message.id.to_string()));
        }
        Ok(format!("payload-{}", message.id).into_bytes())
    }
}

// ============================================================================
// Cursor repository
// ============================================================================

#[derive(Default)]
pub struct FakeCursors {
    cursors: Mutex<HashMap<ChannelId, ChannelCursor>>,
    pub fail_advance: AtomicBool,
    pub advance_calls: AtomicUsize,
}

impl FakeCursors {
    pub fn get(&self, id: i64) -> Option<ChannelCursor> {
        self.cursors.lock().unwrap().get(&ChannelId::new(id)).cloned()
    }

    pub fn seed(&self, id: i64, name: &str, last: i64) {
        let cursor = ChannelCursor::new(ChannelId::new(id), name, MessageId::new(last));
        self.cursors.lock().unwrap().insert(cursor.channel_id, cursor);
    }
}

#[async_trait]
impl CursorRepository for FakeCursors {
    async fn find(&self, channel_id: ChannelId) -> RepoResult<Option<ChannelCursor>> {
        Ok(self.cursors.lock().unwrap().get(&channel_id).cloned())
    }

    async fn create(&self, cursor: &ChannelCursor) -> RepoResult<()> {
        let mut cursors = self.cursors.lock().unwrap();
        if cursors.contains_key(&cursor.channel_id) {
            return Err(DomainError::CursorExists(cursor.channel_id));
        }
        cursors.insert(cursor.channel_id, cursor.clone());
        Ok(())
    }

    async fn advance(
        &self,
        channel_id: ChannelId,
        to: MessageId,
        at: DateTime<Utc>,
    ) -> RepoResult<bool> {
        self.advance_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_advance.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("connection reset".to_string()));
        }
        let mut cursors = self.cursors.lock().unwrap();
        let cursor = cursors
            .get_mut(&channel_id)
            .ok_or(DomainError::CursorNotFound(channel_id))?;
        Ok(cursor.advance(to, at))
    }

    async fn list(&self) -> RepoResult<Vec<ChannelCursor>> {
        let mut cursors: Vec<_> = self.cursors.lock().unwrap().values().cloned().collect();
        cursors.sort_by(|a, b| a.channel_name.cmp(&b.channel_name));
        Ok(cursors)
    }

    async fn delete_all(&self) -> RepoResult<u64> {
        let mut cursors = self.cursors.lock().unwrap();
        let count = cursors.len() as u64;
        cursors.clear();
        Ok(count)
    }
}

// ============================================================================
// Post repository
// ============================================================================

#[derive(Debug, Clone)]
pub struct StoredPost {
    pub post: Post,
    pub messages: Vec<PostMessage>,
    pub media: Vec<MediaAttachment>,
}

#[derive(Default)]
pub struct FakePosts {
    posts: Mutex<Vec<StoredPost>>,
    failing_first_ids: Mutex<HashSet<MessageId>>,
    pub fail_deletes: AtomicBool,
}

impl FakePosts {
    pub fn all(&self) -> Vec<StoredPost> {
        self.posts.lock().unwrap().clone()
    }

    pub fn fail_insert_for(&self, first_message_id: i64) {
        self.failing_first_ids
            .lock()
            .unwrap()
            .insert(MessageId::new(first_message_id));
    }

    pub fn clear_failures(&self) {
        self.failing_first_ids.lock().unwrap().clear();
    }
}

#[async_trait]
impl PostRepository for FakePosts {
    async fn insert_group(
        &self,
        post: &NewPost,
        messages: &[PostMessage],
        media: &[MediaAttachment],
    ) -> RepoResult<Option<PostId>> {
        if self
            .failing_first_ids
            .lock()
            .unwrap()
            .contains(&post.first_message_id)
        {
            return Err(DomainError::DatabaseError("insert failed".to_string()));
        }
        let mut posts = self.posts.lock().unwrap();
        if posts.iter().any(|stored| {
            stored.post.channel_id == post.channel_id
                && stored.post.first_message_id == post.first_message_id
        }) {
            return Ok(None);
        }
        let id = posts.iter().map(|stored| stored.post.id).max().unwrap_or(0) + 1;
        posts.push(StoredPost {
            post: Post {
                id,
                channel_id: post.channel_id,
                channel_name: post.channel_name.clone(),
                group_id: post.group_id,
                first_message_id: post.first_message_id,
                combined_text: post.combined_text.clone(),
                posted_at: post.posted_at,
                ingested_at: post.ingested_at,
                message_link: post.message_link.clone(),
            },
            messages: messages.to_vec(),
            media: media.to_vec(),
        });
        Ok(Some(id))
    }

    async fn find_by_id(&self, id: PostId) -> RepoResult<Option<Post>> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|stored| stored.post.id == id)
            .map(|stored| stored.post.clone()))
    }

    async fn find_messages(&self, post_id: PostId) -> RepoResult<Vec<PostMessage>> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|stored| stored.post.id == post_id)
            .map(|stored| stored.messages.clone())
            .unwrap_or_default())
    }

    async fn find_media(&self, post_id: PostId) -> RepoResult<Vec<MediaAttachment>> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|stored| stored.post.id == post_id)
            .map(|stored| stored.media.clone())
            .unwrap_or_default())
    }

    async fn delete(&self, id: PostId) -> RepoResult<bool> {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|stored| stored.post.id != id);
        Ok(posts.len() < before)
    }

    async fn delete_ingested_before(&self, cutoff: DateTime<Utc>) -> RepoResult<u64> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("lock timeout".to_string()));
        }
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|stored| stored.post.ingested_at >= cutoff);
        Ok((before - posts.len()) as u64)
    }

    async fn delete_all(&self) -> RepoResult<u64> {
        let mut posts = self.posts.lock().unwrap();
        let count = posts.len() as u64;
        posts.clear();
        Ok(count)
    }

    async fn recent(&self, limit: i64) -> RepoResult<Vec<PostSummary>> {
        let mut posts = self.all();
        posts.sort_by(|a, b| b.post.ingested_at.cmp(&a.post.ingested_at));
        posts.truncate(limit.max(0) as usize);
        Ok(posts
            .into_iter()
            .map(|stored| {
                let mut counts: Vec<(MediaKind, i64)> = Vec::new();
                for media in &stored.media {
                    match counts.iter_mut().find(|(kind, _)| *kind == media.kind) {
                        Some((_, count)) => *count += 1,
                        None => counts.push((media.kind, 1)),
                    }
                }
                PostSummary {
                    post: stored.post,
                    media_counts: counts,
                }
            })
            .collect())
    }

    async fn stats(&self) -> RepoResult<PostStats> {
        let posts = self.posts.lock().unwrap();
        Ok(PostStats {
            posts: posts.len() as i64,
            messages: posts.iter().map(|p| p.messages.len() as i64).sum(),
            attachments: posts.iter().map(|p| p.media.len() as i64).sum(),
        })
    }

    async fn media_kind_counts(&self) -> RepoResult<Vec<(MediaKind, i64)>> {
        let mut counts: HashMap<MediaKind, i64> = HashMap::new();
        for stored in self.posts.lock().unwrap().iter() {
            for media in &stored.media {
                *counts.entry(media.kind).or_default() += 1;
            }
        }
        let mut counts: Vec<_> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.as_str().cmp(b.0.as_str())));
        Ok(counts)
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub struct Harness {
    pub source: Arc<FakeSource>,
    pub cursors: Arc<FakeCursors>,
    pub posts: Arc<FakePosts>,
    pub ctx: ServiceContext,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(HarvestSettings {
            channel_delay: std::time::Duration::ZERO,
            ..HarvestSettings::default()
        })
    }

    pub fn with_settings(settings: HarvestSettings) -> Self {
        let source = Arc::new(FakeSource::new());
        let cursors = Arc::new(FakeCursors::default());
        let posts = Arc::new(FakePosts::default());
        let ctx = ServiceContext::new(
            cursors.clone(),
            posts.clone(),
            source.clone(),
            settings,
        );
        Self {
            source,
            cursors,
            posts,
            ctx,
        }
    }
}

pub fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap()
}

/// Plain text message
pub fn text(id: i64, grouped_id: Option<i64>, body: &str) -> SourceMessage {
    SourceMessage {
        id: MessageId::new(id),
        text: body.to_string(),
        grouped_id,
        date: at((id % 60) as u32),
        media: None,
    }
}

/// Message carrying a photo whose largest variant is `size` bytes
pub fn photo(id: i64, grouped_id: Option<i64>, body: &str, size: i64) -> SourceMessage {
    SourceMessage {
        media: Some(MediaDescriptor::Photo {
            id: id * 1000,
            sizes: vec![harvest_core::source::PhotoSize::Sized {
                kind: "x".to_string(),
                size,
            }],
        }),
        ..text(id, grouped_id, body)
    }
}

/// Message carrying a plain document
pub fn document(id: i64, grouped_id: Option<i64>, body: &str) -> SourceMessage {
    SourceMessage {
        media: Some(MediaDescriptor::Document {
            id: id * 1000,
            mime_type: Some("application/pdf".to_string()),
            size: 512,
            attributes: vec![],
        }),
        ..text(id, grouped_id, body)
    }
}
