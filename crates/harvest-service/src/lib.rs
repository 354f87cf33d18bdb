//! # harvest-service
//!
//! Application layer: group assembly, post writing, channel polling, the
//! poll scheduler, and the retention sweeper.

pub mod services;

pub use services::*;
