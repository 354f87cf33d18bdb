//! Entity to model mappers
//!
//! This module provides conversions between domain entities (harvest-core) and database models.
//! - `From<Model> for Entity`: Convert database rows to domain objects
//! - `*Insert` structs: Prepare entity data for database operations

mod cursor;
mod post;

pub use post::{MediaInsert, PostInsert};
