//! Message-source data model
//!
//! These mirror what the source hands back for a channel: the channel
//! itself, its raw messages, and the attachment descriptor carried by a
//! message. They derive serde so a bridge can ship them as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ChannelId, GroupKey, MessageId};

/// A resolved channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceChannel {
    pub id: ChannelId,
    pub title: String,
    #[serde(default)]
    pub username: Option<String>,
}

impl SourceChannel {
    /// Name stored alongside cursors and posts: the username, else the title
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.title)
    }
}

/// One raw message from a channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMessage {
    pub id: MessageId,
    #[serde(default)]
    pub text: String,
    /// Marker shared by every message of a multi-message post
    #[serde(default)]
    pub grouped_id: Option<i64>,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub media: Option<MediaDescriptor>,
}

impl SourceMessage {
    /// Group this message belongs to: its marker, or itself
    pub fn group_key(&self) -> GroupKey {
        match self.grouped_id {
            Some(marker) => GroupKey::Marker(marker),
            None => GroupKey::Single(self.id),
        }
    }

    /// Check if the message carries an attachment descriptor
    #[inline]
    pub fn has_media(&self) -> bool {
        self.media.is_some()
    }
}

/// Attachment descriptor as reported by the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaDescriptor {
    Photo {
        id: i64,
        #[serde(default)]
        sizes: Vec<PhotoSize>,
    },
    Document {
        id: i64,
        #[serde(default)]
        mime_type: Option<String>,
        #[serde(default)]
        size: i64,
        #[serde(default)]
        attributes: Vec<DocumentAttribute>,
    },
    /// Anything else the source attaches (web previews, polls, locations)
    Unsupported {
        #[serde(default)]
        kind: String,
    },
}

/// One resolution variant of a photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PhotoSize {
    Sized {
        #[serde(default)]
        kind: String,
        size: i64,
    },
    Progressive {
        sizes: Vec<i64>,
    },
    /// Thumbnail bytes inlined by the source
    Cached {
        size: i64,
    },
    Stripped,
}

impl PhotoSize {
    /// Largest byte size this variant can produce
    pub fn byte_size(&self) -> i64 {
        match self {
            Self::Sized { size, .. } | Self::Cached { size } => *size,
            Self::Progressive { sizes } => sizes.iter().copied().max().unwrap_or(0),
            Self::Stripped => 0,
        }
    }
}

/// Type markers carried by a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentAttribute {
    Video {
        #[serde(default)]
        round_message: bool,
    },
    Audio {
        #[serde(default)]
        voice: bool,
    },
    Sticker,
    Animated,
    ImageSize {
        w: u32,
        h: u32,
    },
    Filename {
        file_name: String,
    },
}
