//! # harvest-core
//!
//! Domain layer containing ids, entities, the message-source model, the media
//! classifier, and the repository / source traits.
//! This crate has zero dependencies on infrastructure (database, HTTP, etc.).

pub mod classifier;
pub mod entities;
pub mod error;
pub mod source;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use classifier::classify;
pub use entities::{
    combine_text, message_link, ChannelCursor, MediaAttachment, MediaInfo, MediaKind, NewPost,
    Post, PostId, PostMessage,
};
pub use error::DomainError;
pub use source::{
    DocumentAttribute, MediaDescriptor, MessageRange, PhotoSize, SourceChannel, SourceMessage,
};
pub use traits::{
    CursorRepository, MessageSource, PostRepository, PostStats, PostSummary, RepoResult,
    SourceResult,
};
pub use value_objects::{ChannelId, GroupKey, IdParseError, MessageId};
