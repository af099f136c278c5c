//! In-process cache storage.
//!
//! Keeps every namespace in a tokio `RwLock`-guarded list so creation order
//! is preserved. Nothing survives the process.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::storage::CacheStorage;
use crate::Error;
use crate::http::{RequestKey, Response};

#[derive(Debug, Default)]
struct Namespace {
    name: String,
    entries: HashMap<String, (RequestKey, Response)>,
}

/// Ephemeral [`CacheStorage`] backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    namespaces: Arc<RwLock<Vec<Namespace>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

fn find_or_create<'a>(namespaces: &'a mut Vec<Namespace>, name: &str) -> &'a mut Namespace {
    let idx = match namespaces.iter().position(|ns| ns.name == name) {
        Some(idx) => idx,
        None => {
            namespaces.push(Namespace { name: name.to_string(), entries: HashMap::new() });
            namespaces.len() - 1
        }
    };
    &mut namespaces[idx]
}

#[async_trait::async_trait]
impl CacheStorage for MemoryCache {
    async fn open(&self, namespace: &str) -> Result<(), Error> {
        let mut namespaces = self.namespaces.write().await;
        find_or_create(&mut namespaces, namespace);
        Ok(())
    }

    async fn has(&self, namespace: &str) -> Result<bool, Error> {
        let namespaces = self.namespaces.read().await;
        Ok(namespaces.iter().any(|ns| ns.name == namespace))
    }

    async fn delete(&self, namespace: &str) -> Result<bool, Error> {
        let mut namespaces = self.namespaces.write().await;
        let before = namespaces.len();
        namespaces.retain(|ns| ns.name != namespace);
        Ok(namespaces.len() != before)
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        let namespaces = self.namespaces.read().await;
        Ok(namespaces.iter().map(|ns| ns.name.clone()).collect())
    }

    async fn put(&self, namespace: &str, key: &RequestKey, response: &Response) -> Result<(), Error> {
        let mut namespaces = self.namespaces.write().await;
        find_or_create(&mut namespaces, namespace)
            .entries
            .insert(key.hash(), (key.clone(), response.clone()));
        Ok(())
    }

    async fn put_all(&self, namespace: &str, entries: Vec<(RequestKey, Response)>) -> Result<(), Error> {
        let mut namespaces = self.namespaces.write().await;
        let ns = find_or_create(&mut namespaces, namespace);
        for (key, response) in entries {
            ns.entries.insert(key.hash(), (key, response));
        }
        Ok(())
    }

    async fn match_in(&self, namespace: &str, key: &RequestKey) -> Result<Option<Response>, Error> {
        let namespaces = self.namespaces.read().await;
        Ok(namespaces
            .iter()
            .find(|ns| ns.name == namespace)
            .and_then(|ns| ns.entries.get(&key.hash()))
            .map(|(_, response)| response.clone()))
    }

    async fn entry_keys(&self, namespace: &str) -> Result<Vec<RequestKey>, Error> {
        let namespaces = self.namespaces.read().await;
        let mut keys: Vec<RequestKey> = namespaces
            .iter()
            .find(|ns| ns.name == namespace)
            .map(|ns| ns.entries.values().map(|(key, _)| key.clone()).collect())
            .unwrap_or_default();
        keys.sort_by(|a, b| a.url.cmp(&b.url));
        Ok(keys)
    }
}
