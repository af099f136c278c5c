//! Registration: the generation slots of one scope.
//!
//! A registration holds at most one installing, one waiting and one active
//! generation. Fetches are routed through the active one. Hosts are told
//! about updates and controller changes through [`RegistrationEvent`]s.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use swcache_core::{AppConfig, CacheNames, CacheStorage, Error, Request};
use tokio::sync::{Mutex, broadcast};
use url::Url;

use super::lifecycle::{ActivationReport, GenerationId, LifecycleManager, WorkerState};
use super::router::{FetchOutcome, ResponseSource, RoutePolicy, RequestRouter, RoutedResponse};
use crate::fetch::{Network, canonicalize, resolve};

/// Everything a registration needs to build generations.
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub scope: String,
    /// Worker script, absolute or relative to the scope.
    pub script_url: String,
    pub cache_prefix: String,
    pub static_assets: Vec<String>,
    pub shell_document: String,
    pub font_hosts: Vec<String>,
    pub skip_waiting_on_install: bool,
}

impl WorkerSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            scope: config.scope.clone(),
            script_url: config.script_path.clone(),
            cache_prefix: config.cache_prefix.clone(),
            static_assets: config.static_assets.clone(),
            shell_document: config.shell_document.clone(),
            font_hosts: config.font_hosts.clone(),
            skip_waiting_on_install: config.skip_waiting_on_install,
        }
    }
}

/// Control messages accepted from pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    SkipWaiting,
}

impl ControlMessage {
    pub fn parse(message: &str) -> Option<Self> {
        match message {
            "skipWaiting" => Some(Self::SkipWaiting),
            _ => None,
        }
    }
}

/// Notifications broadcast to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistrationEvent {
    /// A new generation finished installing while another one controls pages.
    UpdateAvailable { version: String, active_version: String },
    /// A generation took control of every open page.
    ControllerChange { version: String, purged: Vec<String> },
    InstallFailed { version: String, reason: String },
}

/// One worker generation: its lifecycle plus the router serving for it.
pub struct Generation {
    pub lifecycle: LifecycleManager,
    pub router: RequestRouter,
}

#[derive(Default)]
struct Slots {
    installing: Option<Arc<Generation>>,
    waiting: Option<Arc<Generation>>,
    active: Option<Arc<Generation>>,
    clients: usize,
}

/// State of one slot.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationStatus {
    pub id: GenerationId,
    pub version: String,
    pub state: WorkerState,
    pub names: CacheNames,
    pub created_at: DateTime<Utc>,
}

impl GenerationStatus {
    async fn of(generation: &Generation) -> Self {
        let lifecycle = &generation.lifecycle;
        Self {
            id: lifecycle.id(),
            version: lifecycle.version().to_string(),
            state: lifecycle.state().await,
            names: lifecycle.names().clone(),
            created_at: lifecycle.created_at(),
        }
    }

    async fn of_slot(slot: &Option<Arc<Generation>>) -> Option<Self> {
        let generation = slot.as_ref()?;
        Some(Self::of(generation).await)
    }
}

/// Serializable snapshot of a registration.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationStatus {
    pub scope: String,
    pub script_url: String,
    /// Open pages, all controlled by the active generation.
    pub clients: usize,
    pub installing: Option<GenerationStatus>,
    pub waiting: Option<GenerationStatus>,
    pub active: Option<GenerationStatus>,
}

/// Result of [`Registration::update`].
#[derive(Debug, Clone, Serialize)]
pub struct UpdateOutcome {
    pub id: GenerationId,
    pub version: String,
    /// `waiting` when pages are still held by the previous generation.
    pub state: WorkerState,
    pub purged: Vec<String>,
}

/// Worker registration for one scope.
pub struct Registration {
    scope: Url,
    script_url: Url,
    cache_prefix: String,
    assets: Vec<Url>,
    policy: RoutePolicy,
    skip_waiting_on_install: bool,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    slots: Mutex<Slots>,
    /// Serializes activations so two purges never interleave.
    activation: Mutex<()>,
    events: broadcast::Sender<RegistrationEvent>,
}

impl Registration {
    /// Validate the scope and script URLs and create an empty registration.
    ///
    /// # Errors
    ///
    /// `INVALID_URL` when either URL is not http(s) or the script lives on
    /// another origin, `INVALID_INPUT` when the scope is outside the script's
    /// directory or an asset cannot be resolved.
    pub fn register(
        settings: WorkerSettings, storage: Arc<dyn CacheStorage>, network: Arc<dyn Network>,
    ) -> Result<Self, Error> {
        let scope = canonicalize(&settings.scope)?;
        let script_url = canonicalize(resolve(&scope, &settings.script_url)?.as_str())?;

        if script_url.origin() != scope.origin() {
            return Err(Error::InvalidUrl(format!(
                "script {script_url} is not on the origin of scope {scope}"
            )));
        }

        let script_dir = &script_url.path()[..=script_url.path().rfind('/').unwrap_or(0)];
        if !scope.path().starts_with(script_dir) {
            return Err(Error::InvalidInput(format!(
                "scope {} is outside the script directory {script_dir}",
                scope.path()
            )));
        }

        let assets = settings
            .static_assets
            .iter()
            .map(|asset| resolve(&scope, asset))
            .collect::<Result<Vec<_>, _>>()?;
        let shell_document = resolve(&scope, &settings.shell_document)?;
        let font_hosts = settings
            .font_hosts
            .iter()
            .map(|host| host.trim().trim_end_matches('.').to_ascii_lowercase())
            .filter(|host| !host.is_empty())
            .collect();

        tracing::info!(%scope, script = %script_url, assets = assets.len(), "worker registered");

        let (events, _) = broadcast::channel(32);
        Ok(Self {
            scope,
            script_url,
            cache_prefix: settings.cache_prefix,
            assets,
            policy: RoutePolicy { shell_document, font_hosts },
            skip_waiting_on_install: settings.skip_waiting_on_install,
            storage,
            network,
            slots: Mutex::new(Slots::default()),
            activation: Mutex::new(()),
            events,
        })
    }

    pub fn scope(&self) -> &Url {
        &self.scope
    }

    /// Receive every event broadcast from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<RegistrationEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: RegistrationEvent) {
        tracing::debug!(?event, "registration event");
        let _ = self.events.send(event);
    }

    fn generation(&self, version: &str) -> Arc<Generation> {
        let names = CacheNames::versioned(&self.cache_prefix, version);
        let lifecycle = LifecycleManager::new(
            version,
            names.clone(),
            self.assets.clone(),
            Arc::clone(&self.storage),
            Arc::clone(&self.network),
        );
        let router =
            RequestRouter::new(names, self.policy.clone(), Arc::clone(&self.storage), Arc::clone(&self.network));
        Arc::new(Generation { lifecycle, router })
    }

    /// Install a new generation for `version`.
    ///
    /// On failure the previous active generation keeps serving. On success the
    /// new generation activates right away unless pages are open, another
    /// generation is active and immediate activation is disabled.
    pub async fn update(&self, version: &str) -> Result<UpdateOutcome, Error> {
        if version.is_empty() || version.chars().any(char::is_whitespace) {
            return Err(Error::InvalidInput(format!("invalid version: {version:?}")));
        }

        let generation = self.generation(version);
        let superseded = self.slots.lock().await.installing.replace(Arc::clone(&generation));
        if let Some(previous) = superseded {
            tracing::info!(generation = %previous.lifecycle.id(), "install superseded");
            previous.lifecycle.retire().await;
        }

        tracing::info!(generation = %generation.lifecycle.id(), %version, "installing");
        let installed = generation.lifecycle.install().await;

        let mut slots = self.slots.lock().await;
        if !slots.installing.as_ref().is_some_and(|g| Arc::ptr_eq(g, &generation)) {
            drop(slots);
            generation.lifecycle.retire().await;
            tracing::info!(generation = %generation.lifecycle.id(), %version, "discarding superseded install");
            return Err(Error::InvalidState(format!("install of {version} was superseded")));
        }
        slots.installing = None;

        if let Err(e) = installed {
            drop(slots);
            self.emit(RegistrationEvent::InstallFailed { version: version.to_string(), reason: e.to_string() });
            return Err(e);
        }

        let replaced = slots.waiting.replace(Arc::clone(&generation));
        let active_version = slots.active.as_ref().map(|g| g.lifecycle.version().to_string());
        let clients = slots.clients;
        drop(slots);

        if let Some(replaced) = replaced {
            tracing::info!(generation = %replaced.lifecycle.id(), "waiting generation replaced");
            replaced.lifecycle.retire().await;
        }

        if let Some(active_version) = &active_version
            && active_version != version
        {
            self.emit(RegistrationEvent::UpdateAvailable {
                version: version.to_string(),
                active_version: active_version.clone(),
            });
        }

        let activate_now = active_version.is_none() || clients == 0 || self.skip_waiting_on_install;
        let purged = if activate_now {
            self.activate_waiting()
                .await?
                .map(|report| report.deleted)
                .unwrap_or_default()
        } else {
            tracing::info!(%version, clients, "waiting for open pages to close");
            Vec::new()
        };

        Ok(UpdateOutcome {
            id: generation.lifecycle.id(),
            version: version.to_string(),
            state: generation.lifecycle.state().await,
            purged,
        })
    }

    /// Promote the waiting generation, retire the old active one and claim
    /// every open page.
    ///
    /// The slots lock is only taken around the swaps; fetches keep being
    /// served by the old active generation while the purge runs.
    async fn activate_waiting(&self) -> Result<Option<ActivationReport>, Error> {
        let _activation = self.activation.lock().await;
        let Some(next) = self.slots.lock().await.waiting.take() else {
            return Ok(None);
        };

        let report = match next.lifecycle.activate().await {
            Ok(report) => report,
            Err(e) => {
                next.lifecycle.retire().await;
                return Err(e);
            }
        };

        let (previous, clients) = {
            let mut slots = self.slots.lock().await;
            (slots.active.replace(Arc::clone(&next)), slots.clients)
        };
        if let Some(previous) = previous {
            previous.lifecycle.retire().await;
        }

        tracing::info!(
            generation = %next.lifecycle.id(),
            version = %next.lifecycle.version(),
            clients,
            purged = report.deleted.len(),
            "controller changed"
        );
        self.emit(RegistrationEvent::ControllerChange {
            version: next.lifecycle.version().to_string(),
            purged: report.deleted.clone(),
        });

        Ok(Some(report))
    }

    /// Activate the waiting generation now. Returns `false` when nothing was
    /// waiting.
    pub async fn skip_waiting(&self) -> Result<bool, Error> {
        Ok(self.activate_waiting().await?.is_some())
    }

    /// Handle a message posted by a page. Unknown messages are ignored.
    pub async fn post_message(&self, message: &str) -> Result<bool, Error> {
        match ControlMessage::parse(message) {
            Some(ControlMessage::SkipWaiting) => self.skip_waiting().await,
            None => {
                tracing::debug!(%message, "ignoring unknown message");
                Ok(false)
            }
        }
    }

    pub async fn client_opened(&self) {
        self.slots.lock().await.clients += 1;
    }

    /// Forget one open page. The waiting generation activates once the last
    /// page is gone.
    pub async fn client_closed(&self) -> Result<(), Error> {
        let remaining = {
            let mut slots = self.slots.lock().await;
            slots.clients = slots.clients.saturating_sub(1);
            slots.clients
        };
        if remaining == 0 {
            self.activate_waiting().await?;
        }
        Ok(())
    }

    /// Dispatch a fetch event.
    ///
    /// Without an active generation, or for requests the router does not
    /// intercept, the request goes to the network untouched.
    pub async fn fetch(&self, request: &Request) -> Result<RoutedResponse, Error> {
        let active = self.slots.lock().await.active.clone();

        if let Some(generation) = active
            && let FetchOutcome::Respond(routed) = generation.router.handle(request).await?
        {
            return Ok(routed);
        }

        let response = self.network.fetch(request).await?;
        Ok(RoutedResponse { response, source: ResponseSource::Passthrough, classification: None, refresh: None })
    }

    pub async fn status(&self) -> RegistrationStatus {
        let slots = self.slots.lock().await;
        RegistrationStatus {
            scope: self.scope.to_string(),
            script_url: self.script_url.to_string(),
            clients: slots.clients,
            installing: GenerationStatus::of_slot(&slots.installing).await,
            waiting: GenerationStatus::of_slot(&slots.waiting).await,
            active: GenerationStatus::of_slot(&slots.active).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::testing::{FlakyStorage, ORIGIN, StubNetwork, url};
    use crate::worker::Classification;
    use swcache_core::{CacheDb, Destination, MemoryCache};

    fn settings() -> WorkerSettings {
        WorkerSettings::from_config(&AppConfig { scope: ORIGIN.into(), ..AppConfig::default() })
    }

    fn reachable_shell() -> StubNetwork {
        let network = StubNetwork::new();
        network.respond("./", 200, "<html>root</html>");
        network.respond("./index.html", 200, "<html>shell</html>");
        network.respond("./favicon.svg", 200, "<svg/>");
        network.respond("./resume.pdf", 200, "%PDF-1.7");
        network
    }

    fn register(settings: WorkerSettings, storage: Arc<dyn CacheStorage>, network: &StubNetwork) -> Registration {
        Registration::register(settings, storage, Arc::new(network.clone())).unwrap()
    }

    #[test]
    fn test_control_message_parse() {
        assert_eq!(ControlMessage::parse("skipWaiting"), Some(ControlMessage::SkipWaiting));
        assert_eq!(ControlMessage::parse("skip_waiting"), None);
        assert_eq!(ControlMessage::parse(""), None);
    }

    #[test]
    fn test_register_rejects_cross_origin_script() {
        let mut s = settings();
        s.script_url = "https://cdn.test/sw.js".into();
        let result = Registration::register(s, Arc::new(MemoryCache::new()), Arc::new(StubNetwork::new()));
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_register_rejects_scope_outside_script_dir() {
        let mut s = settings();
        s.script_url = "/js/sw.js".into();
        let result = Registration::register(s, Arc::new(MemoryCache::new()), Arc::new(StubNetwork::new()));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_register_rejects_non_http_scope() {
        let mut s = settings();
        s.scope = "file:///srv/site/".into();
        let result = Registration::register(s, Arc::new(MemoryCache::new()), Arc::new(StubNetwork::new()));
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch_without_active_generation_passes_through() {
        let storage = Arc::new(MemoryCache::new());
        let network = reachable_shell();
        let registration = register(settings(), storage.clone(), &network);

        let routed = registration.fetch(&Request::navigate(url("./index.html"))).await.unwrap();
        assert_eq!(routed.source, ResponseSource::Passthrough);
        assert!(routed.classification.is_none());
        assert!(storage.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_first_update_activates_immediately() {
        let storage = Arc::new(MemoryCache::new());
        let network = reachable_shell();
        let registration = register(settings(), storage.clone(), &network);
        let mut events = registration.subscribe();

        let outcome = registration.update("v1").await.unwrap();
        assert_eq!(outcome.state, WorkerState::Active);

        assert_eq!(
            events.recv().await.unwrap(),
            RegistrationEvent::ControllerChange { version: "v1".into(), purged: vec![] }
        );

        let status = registration.status().await;
        assert_eq!(status.active.map(|g| g.version), Some("v1".into()));
        assert!(status.installing.is_none() && status.waiting.is_none());
    }

    #[tokio::test]
    async fn test_update_purges_previous_version() {
        let storage = Arc::new(CacheDb::open_in_memory().await.unwrap());
        let network = reachable_shell();
        network.respond("/app.js", 200, "app");
        let registration = register(settings(), storage.clone(), &network);

        registration.update("v1").await.unwrap();
        registration
            .fetch(&Request::subresource(url("/app.js"), Destination::Script))
            .await
            .unwrap();
        assert_eq!(storage.keys().await.unwrap(), vec!["portfolio-cache-v1", "portfolio-runtime-v1"]);

        let outcome = registration.update("v2").await.unwrap();
        assert_eq!(outcome.state, WorkerState::Active);
        assert_eq!(outcome.purged, vec!["portfolio-cache-v1", "portfolio-runtime-v1"]);
        assert_eq!(storage.keys().await.unwrap(), vec!["portfolio-cache-v2"]);
    }

    #[tokio::test]
    async fn test_failed_install_keeps_previous_active() {
        let storage = Arc::new(MemoryCache::new());
        let network = reachable_shell();
        let registration = register(settings(), storage.clone(), &network);
        registration.update("v1").await.unwrap();
        let mut events = registration.subscribe();

        network.fail("./favicon.svg");
        let result = registration.update("v2").await;
        assert!(matches!(result, Err(Error::InstallFailed(_))));
        assert!(matches!(events.recv().await.unwrap(), RegistrationEvent::InstallFailed { version, .. } if version == "v2"));

        let status = registration.status().await;
        assert_eq!(status.active.map(|g| g.version), Some("v1".into()));
        assert!(status.installing.is_none());
        assert!(!storage.has("portfolio-cache-v2").await.unwrap());

        network.fail("./index.html");
        let routed = registration.fetch(&Request::navigate(url("./index.html"))).await.unwrap();
        assert_eq!(routed.source, ResponseSource::Cache);
        assert_eq!(routed.response.body.as_ref(), b"<html>shell</html>");
    }

    #[tokio::test]
    async fn test_update_waits_for_open_pages() {
        let storage = Arc::new(MemoryCache::new());
        let network = reachable_shell();
        let registration =
            register(WorkerSettings { skip_waiting_on_install: false, ..settings() }, storage.clone(), &network);
        registration.update("v1").await.unwrap();
        registration.client_opened().await;
        let mut events = registration.subscribe();

        let outcome = registration.update("v2").await.unwrap();
        assert_eq!(outcome.state, WorkerState::Waiting);
        assert_eq!(
            events.recv().await.unwrap(),
            RegistrationEvent::UpdateAvailable { version: "v2".into(), active_version: "v1".into() }
        );

        let status = registration.status().await;
        assert_eq!(status.active.map(|g| g.version), Some("v1".into()));
        assert_eq!(status.waiting.map(|g| g.version), Some("v2".into()));

        registration.client_closed().await.unwrap();
        let status = registration.status().await;
        assert_eq!(status.active.map(|g| g.version), Some("v2".into()));
        assert!(status.waiting.is_none());
    }

    #[tokio::test]
    async fn test_superseded_install_leaves_no_namespace() {
        let storage = Arc::new(MemoryCache::new());
        let network = reachable_shell();
        let gate = network.hold("./resume.pdf");
        let registration = register(settings(), storage.clone(), &network);
        let mut events = registration.subscribe();

        let (first, ()) = tokio::join!(registration.update("v1"), async {
            while network.calls("./resume.pdf") == 0 {
                tokio::task::yield_now().await;
            }
            let outcome = registration.update("v2").await.unwrap();
            assert_eq!(outcome.state, WorkerState::Active);
            gate.notify_one();
        });

        assert!(matches!(first, Err(Error::InvalidState(_))));
        assert_eq!(storage.keys().await.unwrap(), vec!["portfolio-cache-v2"]);
        assert_eq!(
            events.recv().await.unwrap(),
            RegistrationEvent::ControllerChange { version: "v2".into(), purged: vec![] }
        );
        assert!(events.try_recv().is_err());

        let status = registration.status().await;
        assert_eq!(status.active.map(|g| g.version), Some("v2".into()));
        assert!(status.installing.is_none() && status.waiting.is_none());
    }

    #[tokio::test]
    async fn test_fetch_is_served_while_old_caches_are_purged() {
        let storage = Arc::new(FlakyStorage::new());
        let network = reachable_shell();
        network.respond("/app.js", 200, "app");
        let registration = register(settings(), storage.clone(), &network);
        registration.update("v1").await.unwrap();
        registration
            .fetch(&Request::subresource(url("/app.js"), Destination::Script))
            .await
            .unwrap();
        let gate = storage.hold_delete("portfolio-runtime-v1");

        let (updated, ()) = tokio::join!(registration.update("v2"), async {
            while storage.has("portfolio-cache-v1").await.unwrap() {
                tokio::task::yield_now().await;
            }
            let routed = tokio::time::timeout(
                Duration::from_secs(1),
                registration.fetch(&Request::navigate(url("./index.html"))),
            )
            .await
            .expect("fetch blocked behind activation")
            .unwrap();
            assert_eq!(routed.source, ResponseSource::Network);
            gate.notify_one();
        });

        assert_eq!(updated.unwrap().state, WorkerState::Active);
        assert_eq!(storage.keys().await.unwrap(), vec!["portfolio-cache-v2"]);
    }

    #[tokio::test]
    async fn test_font_hosts_match_case_insensitively() {
        let network = reachable_shell();
        network.respond("https://fonts.googleapis.com/css2?family=Inter", 200, "@font-face{}");
        let registration = register(
            WorkerSettings { font_hosts: vec![" Fonts.GoogleAPIs.com ".into()], ..settings() },
            Arc::new(MemoryCache::new()),
            &network,
        );
        registration.update("v1").await.unwrap();

        let css = Request::get(Url::parse("https://fonts.googleapis.com/css2?family=Inter").unwrap());
        let routed = registration.fetch(&css).await.unwrap();
        assert_eq!(routed.classification, Some(Classification::FontProvider));
        assert_eq!(routed.source, ResponseSource::Network);

        network.fail("https://fonts.googleapis.com/css2?family=Inter");
        let routed = registration.fetch(&css).await.unwrap();
        assert_eq!(routed.source, ResponseSource::Cache);
    }

    #[tokio::test]
    async fn test_reinstalling_active_version_is_not_announced() {
        let storage = Arc::new(MemoryCache::new());
        let network = reachable_shell();
        let registration =
            register(WorkerSettings { skip_waiting_on_install: false, ..settings() }, storage.clone(), &network);
        registration.update("v1").await.unwrap();
        registration.client_opened().await;
        let mut events = registration.subscribe();

        let outcome = registration.update("v1").await.unwrap();
        assert_eq!(outcome.state, WorkerState::Waiting);
        assert!(events.try_recv().is_err());

        let status = registration.status().await;
        assert_eq!(status.waiting.map(|g| g.version), Some("v1".into()));
    }

    #[tokio::test]
    async fn test_skip_waiting_message_activates_once() {
        let storage = Arc::new(MemoryCache::new());
        let network = reachable_shell();
        let registration =
            register(WorkerSettings { skip_waiting_on_install: false, ..settings() }, storage.clone(), &network);
        registration.update("v1").await.unwrap();
        registration.client_opened().await;
        registration.update("v2").await.unwrap();
        let mut events = registration.subscribe();

        assert!(registration.post_message("skipWaiting").await.unwrap());
        assert!(!registration.post_message("skipWaiting").await.unwrap());
        assert!(!registration.skip_waiting().await.unwrap());

        match events.recv().await.unwrap() {
            RegistrationEvent::ControllerChange { version, purged } => {
                assert_eq!(version, "v2");
                assert!(purged.contains(&"portfolio-cache-v1".to_string()));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(events.try_recv().is_err());
        assert_eq!(registration.status().await.clients, 1);
    }

    #[tokio::test]
    async fn test_skip_waiting_with_only_active_is_noop() {
        let network = reachable_shell();
        let registration = register(settings(), Arc::new(MemoryCache::new()), &network);
        registration.update("v1").await.unwrap();

        assert!(!registration.skip_waiting().await.unwrap());
        assert!(!registration.skip_waiting().await.unwrap());
        assert!(!registration.post_message("reload").await.unwrap());
        assert_eq!(registration.status().await.active.map(|g| g.state), Some(WorkerState::Active));
    }

    #[tokio::test]
    async fn test_invalid_version_rejected() {
        let network = reachable_shell();
        let registration = register(settings(), Arc::new(MemoryCache::new()), &network);
        assert!(matches!(registration.update("v 2").await, Err(Error::InvalidInput(_))));
        assert!(matches!(registration.update("").await, Err(Error::InvalidInput(_))));
    }
}
