//! Storage abstraction for named cache namespaces.

use crate::Error;
use crate::http::{RequestKey, Response};

/// Named request → response stores, keyed by namespace.
///
/// Writes are full replaces; concurrent writers to the same key resolve as
/// last-write-wins. Implementations must be safe to share across tasks.
#[async_trait::async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create a namespace if it does not exist yet.
    async fn open(&self, namespace: &str) -> Result<(), Error>;

    async fn has(&self, namespace: &str) -> Result<bool, Error>;

    /// Delete a namespace and everything in it. Returns whether it existed.
    async fn delete(&self, namespace: &str) -> Result<bool, Error>;

    /// Namespace names in creation order.
    async fn keys(&self) -> Result<Vec<String>, Error>;

    /// Store one entry, creating the namespace on first use.
    async fn put(&self, namespace: &str, key: &RequestKey, response: &Response) -> Result<(), Error>;

    /// Create the namespace and store every entry as a single unit.
    ///
    /// Either all entries become visible or none do.
    async fn put_all(&self, namespace: &str, entries: Vec<(RequestKey, Response)>) -> Result<(), Error>;

    async fn match_in(&self, namespace: &str, key: &RequestKey) -> Result<Option<Response>, Error>;

    /// Request keys stored in a namespace; empty when it does not exist.
    async fn entry_keys(&self, namespace: &str) -> Result<Vec<RequestKey>, Error>;
}
