//! Media classifier
//!
//! Maps an attachment descriptor to `(kind, file_id, mime, size)`. Pure and
//! total: anything it cannot place becomes a `document` with whatever mime
//! and size the descriptor offers.

use crate::entities::{MediaInfo, MediaKind};
use crate::source::{DocumentAttribute, MediaDescriptor};
use crate::value_objects::MessageId;

/// Classify the attachment carried by message `message_id`
pub fn classify(message_id: MessageId, descriptor: &MediaDescriptor) -> MediaInfo {
    match descriptor {
        MediaDescriptor::Photo { id, sizes } => MediaInfo {
            kind: MediaKind::Photo,
            file_id: id.to_string(),
            mime_type: Some("image/jpeg".to_string()),
            file_size: sizes.iter().map(|s| s.byte_size()).max().unwrap_or(0),
        },
        MediaDescriptor::Document {
            id,
            mime_type,
            size,
            attributes,
        } => MediaInfo {
            kind: document_kind(attributes),
            file_id: id.to_string(),
            mime_type: mime_type.clone(),
            file_size: (*size).max(0),
        },
        MediaDescriptor::Unsupported { .. } => MediaInfo {
            kind: MediaKind::Document,
            file_id: message_id.to_string(),
            mime_type: None,
            file_size: 0,
        },
    }
}

/// Precedence: video > audio > sticker > animation > sized image > document
fn document_kind(attributes: &[DocumentAttribute]) -> MediaKind {
    let has = |pred: fn(&DocumentAttribute) -> bool| attributes.iter().any(pred);

    if has(|a| matches!(a, DocumentAttribute::Video { .. })) {
        MediaKind::Video
    } else if has(|a| matches!(a, DocumentAttribute::Audio { .. })) {
        MediaKind::Audio
    } else if has(|a| matches!(a, DocumentAttribute::Sticker)) {
        MediaKind::Sticker
    } else if has(|a| matches!(a, DocumentAttribute::Animated)) {
        MediaKind::Animation
    } else if has(|a| matches!(a, DocumentAttribute::ImageSize { .. })) {
        MediaKind::Photo
    } else {
        MediaKind::Document
    }
}
