//! # harvest-source
//!
//! [`MessageSource`](harvest_core::MessageSource) implementation backed by a
//! session bridge: a small HTTP service that holds the network session and
//! exposes channels, message ranges, and media downloads as JSON.

mod client;
mod error;

pub use client::{HttpMessageSource, SourceClientConfig};
