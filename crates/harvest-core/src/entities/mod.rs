//! Domain entities - core business objects

mod cursor;
mod media;
mod post;

pub use cursor::ChannelCursor;
pub use media::{MediaAttachment, MediaInfo, MediaKind};
pub use post::{combine_text, message_link, NewPost, Post, PostId, PostMessage};
