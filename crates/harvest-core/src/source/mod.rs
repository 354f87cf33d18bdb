//! Message source model - what a channel looks like from the outside

mod message;
mod range;

pub use message::{
    DocumentAttribute, MediaDescriptor, PhotoSize, SourceChannel, SourceMessage,
};
pub use range::MessageRange;
