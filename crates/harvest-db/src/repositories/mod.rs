//! Repository implementations - PostgreSQL implementations of repository traits

mod cursor;
mod error;
mod post;

pub use cursor::PgCursorRepository;
pub use post::PgPostRepository;
