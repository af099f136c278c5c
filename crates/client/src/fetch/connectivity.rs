//! Online/offline switch in front of a network.
//!
//! Every [`GatedNetwork`] sharing a [`Connectivity`] fails fast with
//! `NETWORK_OFFLINE` while the switch is off. Subscribers are told about
//! each transition.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use swcache_core::{Error, Request, Response};
use tokio::sync::broadcast;

use super::Network;

/// Shared online flag with change notifications.
#[derive(Debug, Clone)]
pub struct Connectivity {
    online: Arc<AtomicBool>,
    changes: broadcast::Sender<bool>,
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Connectivity {
    pub fn new(online: bool) -> Self {
        let (changes, _) = broadcast::channel(16);
        Self { online: Arc::new(AtomicBool::new(online)), changes }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    /// Flip the switch. Returns whether the state actually changed;
    /// subscribers only hear about real transitions.
    pub fn set_online(&self, online: bool) -> bool {
        let previous = self.online.swap(online, Ordering::AcqRel);
        if previous == online {
            return false;
        }
        tracing::info!(online, "connectivity changed");
        let _ = self.changes.send(online);
        true
    }

    /// Receive `true`/`false` on every online/offline transition.
    pub fn subscribe(&self) -> broadcast::Receiver<bool> {
        self.changes.subscribe()
    }
}

/// A network that refuses every request while offline.
pub struct GatedNetwork<N> {
    inner: N,
    connectivity: Connectivity,
}

impl<N: Network> GatedNetwork<N> {
    pub fn new(inner: N, connectivity: Connectivity) -> Self {
        Self { inner, connectivity }
    }
}

#[async_trait::async_trait]
impl<N: Network> Network for GatedNetwork<N> {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        if !self.connectivity.is_online() {
            tracing::debug!(url = %request.url, "offline, refusing fetch");
            return Err(Error::Offline);
        }
        self.inner.fetch(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubNetwork, url};

    #[tokio::test]
    async fn test_gate_blocks_when_offline() {
        let stub = StubNetwork::new();
        stub.respond("/index.html", 200, "<html>");
        let connectivity = Connectivity::new(true);
        let network = GatedNetwork::new(stub, connectivity.clone());
        let request = Request::get(url("/index.html"));

        assert!(network.fetch(&request).await.is_ok());

        connectivity.set_online(false);
        assert!(matches!(network.fetch(&request).await, Err(Error::Offline)));

        connectivity.set_online(true);
        assert!(network.fetch(&request).await.is_ok());
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions_only() {
        let connectivity = Connectivity::default();
        let mut rx = connectivity.subscribe();

        assert!(!connectivity.set_online(true));
        assert!(connectivity.set_online(false));
        assert!(connectivity.set_online(true));

        assert!(!rx.recv().await.unwrap());
        assert!(rx.recv().await.unwrap());
        assert!(rx.try_recv().is_err());
    }
}
