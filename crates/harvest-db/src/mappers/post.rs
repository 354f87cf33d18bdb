//! Post, message, and attachment entity <-> model mappers

use harvest_core::entities::{MediaAttachment, MediaKind, NewPost, Post, PostMessage};
use harvest_core::error::DomainError;
use harvest_core::value_objects::{ChannelId, MessageId};

use crate::models::{MediaAttachmentModel, PostMessageModel, PostModel};

/// Convert PostModel to Post entity
impl From<PostModel> for Post {
    fn from(model: PostModel) -> Self {
        Post {
            id: model.id,
            channel_id: ChannelId::new(model.channel_id),
            channel_name: model.channel_name,
            group_id: model.group_id,
            first_message_id: MessageId::new(model.first_message_id),
            combined_text: model.combined_text,
            posted_at: model.posted_at,
            ingested_at: model.ingested_at,
            message_link: model.message_link,
        }
    }
}

/// Convert PostMessageModel to PostMessage entity
impl From<PostMessageModel> for PostMessage {
    fn from(model: PostMessageModel) -> Self {
        PostMessage {
            message_id: MessageId::new(model.message_id),
            text: model.text,
        }
    }
}

/// Convert MediaAttachmentModel to MediaAttachment entity
///
/// The kind column is free text, so this conversion can fail.
impl TryFrom<MediaAttachmentModel> for MediaAttachment {
    type Error = DomainError;

    fn try_from(model: MediaAttachmentModel) -> Result<Self, Self::Error> {
        Ok(MediaAttachment {
            kind: model.kind.parse::<MediaKind>()?,
            file_id: model.file_id,
            mime_type: model.mime_type,
            file_size: model.file_size,
            payload: model.payload,
        })
    }
}

/// Convert NewPost entity reference to values for database insertion
pub struct PostInsert<'a> {
    pub channel_id: i64,
    pub channel_name: &'a str,
    pub group_id: i64,
    pub first_message_id: i64,
    pub combined_text: &'a str,
    pub message_link: Option<&'a str>,
}

impl<'a> PostInsert<'a> {
    pub fn new(post: &'a NewPost) -> Self {
        Self {
            channel_id: post.channel_id.into_inner(),
            channel_name: &post.channel_name,
            group_id: post.group_id,
            first_message_id: post.first_message_id.into_inner(),
            combined_text: &post.combined_text,
            message_link: post.message_link.as_deref(),
        }
    }
}

/// Convert MediaAttachment entity reference to values for database insertion
pub struct MediaInsert<'a> {
    pub kind: &'static str,
    pub file_id: &'a str,
    pub mime_type: Option<&'a str>,
    pub file_size: i64,
    pub payload: &'a [u8],
}

impl<'a> MediaInsert<'a> {
    pub fn new(media: &'a MediaAttachment) -> Self {
        Self {
            kind: media.kind.as_str(),
            file_id: &media.file_id,
            mime_type: media.mime_type.as_deref(),
            file_size: media.file_size,
            payload: &media.payload,
        }
    }
}
