//! Cache-related MCP tools.
//!
//! Read-only views of the namespace storage shared with the worker.

pub mod get;
pub mod keys;

pub use get::{CacheGetParams, get_impl};
pub use keys::{CacheKeysParams, keys_impl};
