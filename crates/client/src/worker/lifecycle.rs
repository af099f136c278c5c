//! Worker lifecycle: install, activate and retire one generation.
//!
//! ```text
//! installing ──install ok──▶ waiting ──activate──▶ activating ──▶ active
//!     │                                                             │
//!     └──install failed──▶ redundant ◀──────────retire──────────────┘
//! ```
//!
//! Install precaches the app shell all-or-nothing. Activation purges every
//! namespace that is not one of this generation's [`CacheNames`]; a purge
//! failure is logged and left for the next activation.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use serde::Serialize;
use swcache_core::{CacheNames, CacheStorage, Error, Request, RequestKey, Response};
use tokio::sync::{RwLock, broadcast};
use url::Url;

use crate::fetch::Network;

/// Unique identifier of a worker generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GenerationId(u64);

impl GenerationId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GenerationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state of one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Installing,
    /// Installed, not yet controlling pages.
    Waiting,
    Activating,
    Active,
    /// Terminal: install failed or superseded.
    Redundant,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Installing => "installing",
            Self::Waiting => "waiting",
            Self::Activating => "activating",
            Self::Active => "active",
            Self::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

/// Outcome of the activation purge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivationReport {
    /// Stale namespaces removed.
    pub deleted: Vec<String>,
    /// Stale namespaces that could not be removed this time.
    pub failed: Vec<String>,
}

/// Drives one generation through its lifecycle.
pub struct LifecycleManager {
    id: GenerationId,
    version: String,
    created_at: DateTime<Utc>,
    names: CacheNames,
    assets: Vec<Url>,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    state: RwLock<WorkerState>,
    changes: broadcast::Sender<WorkerState>,
}

impl LifecycleManager {
    pub fn new(
        version: impl Into<String>, names: CacheNames, assets: Vec<Url>, storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
    ) -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            id: GenerationId::next(),
            version: version.into(),
            created_at: Utc::now(),
            names,
            assets,
            storage,
            network,
            state: RwLock::new(WorkerState::Installing),
            changes,
        }
    }

    pub fn id(&self) -> GenerationId {
        self.id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn names(&self) -> &CacheNames {
        &self.names
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    /// Receive every state this generation enters from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<WorkerState> {
        self.changes.subscribe()
    }

    /// Record `next` through a held write guard and notify subscribers.
    fn enter(&self, state: &mut WorkerState, next: WorkerState) {
        if *state == next {
            return;
        }
        tracing::debug!(generation = %self.id, version = %self.version, from = %*state, to = %next, "state change");
        *state = next;
        let _ = self.changes.send(next);
    }

    async fn set_state(&self, next: WorkerState) {
        let mut state = self.state.write().await;
        self.enter(&mut state, next);
    }

    async fn transition(&self, from: WorkerState, to: WorkerState) -> Result<(), Error> {
        let mut state = self.state.write().await;
        if *state != from {
            return Err(Error::InvalidState(format!(
                "generation {} ({}) is {}, expected {}",
                self.id, self.version, *state, from
            )));
        }
        self.enter(&mut state, to);
        Ok(())
    }

    /// Precache the asset list into the static namespace.
    ///
    /// All assets are fetched first; the namespace is only written once every
    /// one of them came back `ok`, in a single `put_all`. On any failure the
    /// generation becomes redundant and nothing is persisted.
    pub async fn install(&self) -> Result<(), Error> {
        let state = self.state().await;
        if state != WorkerState::Installing {
            return Err(Error::InvalidState(format!("generation {} is {}, expected installing", self.id, state)));
        }

        tracing::info!(
            generation = %self.id,
            namespace = %self.names.static_name,
            assets = self.assets.len(),
            "caching static assets"
        );

        let entries = match try_join_all(self.assets.iter().map(|url| self.precache(url))).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(generation = %self.id, version = %self.version, error = %e, "install failed");
                self.set_state(WorkerState::Redundant).await;
                return Err(e);
            }
        };

        // Held across the write so a concurrent retire cannot slip in between
        // the check and the namespace appearing.
        let mut state = self.state.write().await;
        if *state != WorkerState::Installing {
            tracing::info!(generation = %self.id, version = %self.version, state = %*state, "install abandoned");
            return Err(Error::InvalidState(format!(
                "generation {} ({}) became {} while installing",
                self.id, self.version, *state
            )));
        }

        if let Err(e) = self.storage.put_all(&self.names.static_name, entries).await {
            tracing::warn!(generation = %self.id, namespace = %self.names.static_name, error = %e, "install failed");
            self.enter(&mut state, WorkerState::Redundant);
            return Err(Error::InstallFailed(format!("writing {}: {}", self.names.static_name, e)));
        }

        self.enter(&mut state, WorkerState::Waiting);
        Ok(())
    }

    async fn precache(&self, url: &Url) -> Result<(RequestKey, Response), Error> {
        let request = Request::get(url.clone());
        let response = self
            .network
            .fetch(&request)
            .await
            .map_err(|e| Error::InstallFailed(format!("{url}: {e}")))?;

        if !response.is_ok() {
            return Err(Error::InstallFailed(format!("{url} returned {}", response.status)));
        }

        Ok((request.key(), response.snapshot()))
    }

    /// Become the active generation, purging stale namespaces.
    ///
    /// Purge failures never block activation; they are reported and retried
    /// by the next activation.
    pub async fn activate(&self) -> Result<ActivationReport, Error> {
        self.transition(WorkerState::Waiting, WorkerState::Activating).await?;

        let mut report = ActivationReport::default();
        match self.storage.keys().await {
            Ok(existing) => {
                for name in existing.into_iter().filter(|name| !self.names.is_current(name)) {
                    match self.storage.delete(&name).await {
                        Ok(_) => {
                            tracing::info!(generation = %self.id, namespace = %name, "deleting old cache");
                            report.deleted.push(name);
                        }
                        Err(e) => {
                            tracing::warn!(generation = %self.id, namespace = %name, error = %e, "failed to delete old cache");
                            report.failed.push(name);
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(generation = %self.id, error = %e, "could not enumerate caches; skipping purge");
            }
        }

        self.transition(WorkerState::Activating, WorkerState::Active).await?;
        Ok(report)
    }

    /// Mark this generation redundant. Idempotent.
    pub async fn retire(&self) {
        self.set_state(WorkerState::Redundant).await;
    }
}
