//! jsoncache library
//!
//! A disk-backed cache for JSON objects keyed by string identifiers. The
//! `cli` module is exposed for the `jsoncache` binary and its integration tests.

pub mod cache;
pub mod cli;

pub use cache::{CacheError, FileCache, JsonOriginatedObject, JsonSource};
