//! Database models - SQLx-compatible structs for PostgreSQL tables

mod cursor;
mod post;

pub use cursor::CursorModel;
pub use post::{
    MediaAttachmentModel, MediaKindCountModel, PostMediaCountModel, PostMessageModel, PostModel,
    PostStatsModel,
};
