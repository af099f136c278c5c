//! Core types and shared functionality for swcache.
//!
//! This crate provides:
//! - Request/response model and request keys
//! - Cache namespace storage (SQLite and in-memory backends)
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod http;

pub use cache::{CacheDb, CacheStorage, MemoryCache};
pub use config::{AppConfig, CacheNames, ConfigError};
pub use error::Error;
pub use http::{Destination, Request, RequestKey, RequestMode, Response};
