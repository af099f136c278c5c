//! Shared state behind every tool call.

use std::sync::Arc;

use swcache_client::{Connectivity, Network, Registration, RegistrationEvent, WorkerSettings};
use swcache_core::{AppConfig, CacheStorage, Error};
use tokio::sync::broadcast::error::RecvError;

pub struct AppState {
    pub config: AppConfig,
    pub storage: Arc<dyn CacheStorage>,
    pub registration: Registration,
    pub connectivity: Connectivity,
}

impl AppState {
    /// Register the worker for the configured scope.
    ///
    /// `network` is expected to sit behind `connectivity`.
    pub fn new(
        config: AppConfig, storage: Arc<dyn CacheStorage>, network: Arc<dyn Network>, connectivity: Connectivity,
    ) -> Result<Self, Error> {
        let registration = Registration::register(WorkerSettings::from_config(&config), Arc::clone(&storage), network)?;
        Ok(Self { config, storage, registration, connectivity })
    }

    /// Log registration events and connectivity changes until the state is
    /// dropped.
    pub fn spawn_event_log(&self) -> tokio::task::JoinHandle<()> {
        let mut events = self.registration.subscribe();
        let mut online = self.connectivity.subscribe();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    event = events.recv() => match event {
                        Ok(RegistrationEvent::UpdateAvailable { version, active_version }) => {
                            tracing::info!(%version, %active_version, "update available");
                        }
                        Ok(RegistrationEvent::ControllerChange { version, purged }) => {
                            tracing::info!(%version, purged = ?purged, "controller changed");
                        }
                        Ok(RegistrationEvent::InstallFailed { version, reason }) => {
                            tracing::warn!(%version, %reason, "install failed");
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::debug!(skipped, "event log lagged");
                        }
                        Err(RecvError::Closed) => break,
                    },
                    change = online.recv() => match change {
                        Ok(online) => tracing::info!(online, "network status changed"),
                        Err(RecvError::Lagged(_)) => {}
                        Err(RecvError::Closed) => break,
                    },
                }
            }
        })
    }
}
