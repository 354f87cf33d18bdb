//! Media attachment entity

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Classified kind of a media attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
    Document,
    Audio,
    Sticker,
    Animation,
}

impl MediaKind {
    /// All kinds, in display order
    pub const ALL: [MediaKind; 6] = [
        Self::Photo,
        Self::Video,
        Self::Document,
        Self::Audio,
        Self::Sticker,
        Self::Animation,
    ];

    /// Storage / wire representation
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Video => "video",
            Self::Document => "document",
            Self::Audio => "audio",
            Self::Sticker => "sticker",
            Self::Animation => "animation",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DomainError::InvalidMediaKind(s.to_string()))
    }
}

/// Attachment metadata produced by the classifier, before download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaInfo {
    pub kind: MediaKind,
    pub file_id: String,
    pub mime_type: Option<String>,
    pub file_size: i64,
}

/// Downloaded attachment owned by a post
#[derive(Clone, PartialEq, Eq)]
pub struct MediaAttachment {
    pub kind: MediaKind,
    pub file_id: String,
    pub mime_type: Option<String>,
    pub file_size: i64,
    pub payload: Vec<u8>,
}

impl MediaAttachment {
    /// Attach a downloaded payload to classified metadata
    pub fn new(info: MediaInfo, payload: Vec<u8>) -> Self {
        Self {
            kind: info.kind,
            file_id: info.file_id,
            mime_type: info.mime_type,
            file_size: info.file_size,
            payload,
        }
    }

    /// Check if attachment is an image
    pub fn is_image(&self) -> bool {
        self.kind == MediaKind::Photo
            || self
                .mime_type
                .as_deref()
                .is_some_and(|mime| mime.starts_with("image/"))
    }
}

// Payloads can be megabytes; keep them out of logs
impl fmt::Debug for MediaAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaAttachment")
            .field("kind", &self.kind)
            .field("file_id", &self.file_id)
            .field("mime_type", &self.mime_type)
            .field("file_size", &self.file_size)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}
