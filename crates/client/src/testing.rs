//! Scripted network and storage doubles for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use swcache_core::{CacheStorage, Error, MemoryCache, Request, RequestKey, Response};
use tokio::sync::Notify;
use url::Url;

use crate::fetch::Network;

pub(crate) const ORIGIN: &str = "https://folio.test/";

/// Absolute URL on the test origin.
pub(crate) fn url(path: &str) -> Url {
    Url::parse(ORIGIN).unwrap().join(path).unwrap()
}

#[derive(Clone)]
enum Reply {
    Respond(u16, &'static str),
    Fail,
}

/// Network answering from a per-URL script.
///
/// Unscripted URLs fail like an unreachable host.
#[derive(Clone, Default)]
pub(crate) struct StubNetwork {
    replies: Arc<Mutex<HashMap<String, Reply>>>,
    holds: Arc<Mutex<HashMap<String, Arc<Notify>>>>,
    calls: Arc<Mutex<HashMap<String, usize>>>,
}

impl StubNetwork {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, path: &str, status: u16, body: &'static str) {
        self.replies
            .lock()
            .unwrap()
            .insert(url(path).to_string(), Reply::Respond(status, body));
    }

    pub(crate) fn fail(&self, path: &str) {
        self.replies.lock().unwrap().insert(url(path).to_string(), Reply::Fail);
    }

    /// Make the next fetch of `path` wait until the returned gate is notified.
    pub(crate) fn hold(&self, path: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.holds.lock().unwrap().insert(url(path).to_string(), gate.clone());
        gate
    }

    pub(crate) fn calls(&self, path: &str) -> usize {
        self.calls.lock().unwrap().get(url(path).as_str()).copied().unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl Network for StubNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let key = request.url.to_string();
        *self.calls.lock().unwrap().entry(key.clone()).or_default() += 1;

        let gate = self.holds.lock().unwrap().remove(&key);
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let reply = self.replies.lock().unwrap().get(&key).cloned();
        match reply {
            Some(Reply::Respond(status, body)) => Ok(Response::new(key, status, body)),
            Some(Reply::Fail) | None => Err(Error::Network(format!("{key}: connection refused"))),
        }
    }
}

/// In-memory storage whose writes or deletes can be made to fail.
#[derive(Clone, Default)]
pub(crate) struct FlakyStorage {
    inner: MemoryCache,
    fail_writes: Arc<AtomicBool>,
    fail_deletes: Arc<Mutex<HashSet<String>>>,
    delete_gates: Arc<Mutex<HashMap<String, Arc<Notify>>>>,
}

impl FlakyStorage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_delete(&self, namespace: &str) {
        self.fail_deletes.lock().unwrap().insert(namespace.to_string());
    }

    /// Make the next delete of `namespace` wait until the returned gate is notified.
    pub(crate) fn hold_delete(&self, namespace: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.delete_gates
            .lock()
            .unwrap()
            .insert(namespace.to_string(), gate.clone());
        gate
    }

    pub(crate) fn heal_deletes(&self) {
        self.fail_deletes.lock().unwrap().clear();
    }

    fn check_write(&self) -> Result<(), Error> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Storage("quota exceeded".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl CacheStorage for FlakyStorage {
    async fn open(&self, namespace: &str) -> Result<(), Error> {
        self.inner.open(namespace).await
    }

    async fn has(&self, namespace: &str) -> Result<bool, Error> {
        self.inner.has(namespace).await
    }

    async fn delete(&self, namespace: &str) -> Result<bool, Error> {
        let gate = self.delete_gates.lock().unwrap().remove(namespace);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_deletes.lock().unwrap().contains(namespace) {
            return Err(Error::Storage(format!("{namespace} is locked")));
        }
        self.inner.delete(namespace).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.inner.keys().await
    }

    async fn put(&self, namespace: &str, key: &RequestKey, response: &Response) -> Result<(), Error> {
        self.check_write()?;
        self.inner.put(namespace, key, response).await
    }

    async fn put_all(&self, namespace: &str, entries: Vec<(RequestKey, Response)>) -> Result<(), Error> {
        self.check_write()?;
        self.inner.put_all(namespace, entries).await
    }

    async fn match_in(&self, namespace: &str, key: &RequestKey) -> Result<Option<Response>, Error> {
        self.inner.match_in(namespace, key).await
    }

    async fn entry_keys(&self, namespace: &str) -> Result<Vec<RequestKey>, Error> {
        self.inner.entry_keys(namespace).await
    }
}
