//! Cache namespace storage.
//!
//! Responses are stored per named namespace behind the [`CacheStorage`]
//! trait, with two backends:
//!
//! - [`CacheDb`]: SQLite via tokio-rusqlite, WAL mode, versioned migrations,
//!   namespace deletes cascade to their entries
//! - [`MemoryCache`]: process-local, for ephemeral hosts and tests

pub mod connection;
pub mod hash;
pub mod memory;
pub mod migrations;
pub mod namespaces;
pub mod storage;

pub use crate::Error;

pub use connection::CacheDb;
pub use memory::MemoryCache;
pub use storage::CacheStorage;
