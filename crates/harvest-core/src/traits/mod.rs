//! Ports implemented by the infrastructure crates

mod repositories;
mod source;

pub use repositories::{CursorRepository, PostRepository, PostStats, PostSummary, RepoResult};
pub use source::{MessageSource, SourceResult};
