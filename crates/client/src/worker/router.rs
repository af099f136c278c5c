//! Request routing and caching strategies.
//!
//! Every intercepted GET http(s) request is classified and served by one
//! strategy:
//!
//! | Classification    | Strategy                                      |
//! |-------------------|-----------------------------------------------|
//! | `navigation`      | network-first, cached match, then shell        |
//! | `static-resource` | cache-first, background refresh on a hit       |
//! | `font-provider`   | cache-first, no refresh                        |
//! | `other`           | network-first, cached match                    |
//!
//! Stored copies are always snapshots taken before the live response is
//! returned. Cache write failures are logged and never affect the response.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use swcache_core::{CacheNames, CacheStorage, Error, Request, RequestKey, RequestMode, Response};
use tokio::task::JoinHandle;
use url::Url;

use crate::fetch::Network;

/// Routing tag for an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    Navigation,
    StaticResource,
    FontProvider,
    Other,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Navigation => "navigation",
            Self::StaticResource => "static-resource",
            Self::FontProvider => "font-provider",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Network,
    Cache,
    /// The cached shell document standing in for a failed navigation.
    Shell,
    /// Not intercepted; fetched untouched.
    Passthrough,
}

/// A response produced for an intercepted request.
#[derive(Debug)]
pub struct RoutedResponse {
    pub response: Response,
    pub source: ResponseSource,
    /// `None` for pass-through requests.
    pub classification: Option<Classification>,
    /// Background refresh spawned alongside a cached response. The requester
    /// never has to wait on it.
    pub refresh: Option<JoinHandle<()>>,
}

/// Result of routing one request.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Not ours: the request proceeds to the network unmodified.
    PassThrough,
    Respond(RoutedResponse),
}

/// Fixed inputs of the routing policy.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    /// Fallback document for failed navigations.
    pub shell_document: Url,
    /// Hosts served cache-first without refresh. Subdomains match too.
    pub font_hosts: Vec<String>,
}

impl RoutePolicy {
    fn is_font_host(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        self.font_hosts
            .iter()
            .any(|font| host == font || host.strip_suffix(font.as_str()).is_some_and(|rest| rest.ends_with('.')))
    }
}

/// Serves requests for one generation.
pub struct RequestRouter {
    names: CacheNames,
    policy: RoutePolicy,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
}

impl RequestRouter {
    pub fn new(
        names: CacheNames, policy: RoutePolicy, storage: Arc<dyn CacheStorage>, network: Arc<dyn Network>,
    ) -> Self {
        Self { names, policy, storage, network }
    }

    /// Classify a request, or `None` when it must not be intercepted.
    pub fn classify(&self, request: &Request) -> Option<Classification> {
        if !request.is_get() || !request.is_http() {
            return None;
        }

        let classification = if request.mode == RequestMode::Navigate {
            Classification::Navigation
        } else if request.destination.is_static_asset() {
            Classification::StaticResource
        } else if self.policy.is_font_host(&request.url) {
            Classification::FontProvider
        } else {
            Classification::Other
        };
        Some(classification)
    }

    /// Produce a response for an intercepted request.
    ///
    /// # Errors
    ///
    /// Only when the network failed and no cached fallback exists for the
    /// strategy in play.
    pub async fn handle(&self, request: &Request) -> Result<FetchOutcome, Error> {
        let Some(classification) = self.classify(request) else {
            tracing::trace!(method = %request.method, url = %request.url, "not intercepted");
            return Ok(FetchOutcome::PassThrough);
        };

        tracing::debug!(url = %request.url, %classification, "routing request");

        let routed = match classification {
            Classification::Navigation => self.network_first(request, classification, true).await?,
            Classification::StaticResource => self.cache_first(request, classification, true).await?,
            Classification::FontProvider => self.cache_first(request, classification, false).await?,
            Classification::Other => self.network_first(request, classification, false).await?,
        };

        Ok(FetchOutcome::Respond(routed))
    }

    async fn network_first(
        &self, request: &Request, classification: Classification, shell_fallback: bool,
    ) -> Result<RoutedResponse, Error> {
        let key = request.key();

        match self.network.fetch(request).await {
            Ok(response) => {
                // Navigations keep whatever the server said; other requests only keep successes.
                if shell_fallback || response.is_ok() {
                    self.store(&key, &response).await;
                }
                Ok(routed(response, ResponseSource::Network, classification))
            }
            Err(network_err) if !network_err.is_network() => Err(network_err),
            Err(network_err) => {
                tracing::debug!(url = %request.url, error = %network_err, "network failed, trying cache");

                if let Some(cached) = self.lookup(&key).await {
                    return Ok(routed(cached, ResponseSource::Cache, classification));
                }

                if shell_fallback {
                    let shell_key = RequestKey::new("GET", &self.policy.shell_document);
                    if let Some(shell) = self.lookup(&shell_key).await {
                        tracing::info!(url = %request.url, shell = %self.policy.shell_document, "serving offline shell");
                        return Ok(routed(shell, ResponseSource::Shell, classification));
                    }
                }

                Err(Error::NoResponse(format!("{}: {}", request.url, network_err)))
            }
        }
    }

    async fn cache_first(
        &self, request: &Request, classification: Classification, refresh: bool,
    ) -> Result<RoutedResponse, Error> {
        let key = request.key();

        if let Some(cached) = self.lookup(&key).await {
            let mut served = routed(cached, ResponseSource::Cache, classification);
            if refresh {
                served.refresh = Some(self.spawn_refresh(request.clone()));
            }
            return Ok(served);
        }

        let response = self.network.fetch(request).await?;
        // Cross-origin font responses can be opaque, so font hosts keep any status.
        if classification == Classification::FontProvider || response.is_ok() {
            self.store(&key, &response).await;
        }
        Ok(routed(response, ResponseSource::Network, classification))
    }

    /// Refresh the runtime entry without holding up the requester.
    fn spawn_refresh(&self, request: Request) -> JoinHandle<()> {
        let storage = Arc::clone(&self.storage);
        let network = Arc::clone(&self.network);
        let namespace = self.names.runtime_name.clone();

        tokio::spawn(async move {
            match network.fetch(&request).await {
                Ok(response) if response.is_ok() => {
                    if let Err(e) = storage.put(&namespace, &request.key(), &response.snapshot()).await {
                        tracing::debug!(url = %request.url, error = %e, "background refresh not stored");
                    } else {
                        tracing::trace!(url = %request.url, "background refresh stored");
                    }
                }
                Ok(response) => {
                    tracing::debug!(url = %request.url, status = response.status, "background refresh skipped");
                }
                Err(e) => {
                    tracing::debug!(url = %request.url, error = %e, "background refresh failed");
                }
            }
        })
    }

    /// Look in the static namespace, then the runtime one. Storage errors
    /// count as a miss.
    async fn lookup(&self, key: &RequestKey) -> Option<Response> {
        for namespace in self.names.lookup_order() {
            match self.storage.match_in(namespace, key).await {
                Ok(Some(response)) => return Some(response),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(%namespace, %key, error = %e, "cache lookup failed");
                }
            }
        }
        None
    }

    async fn store(&self, key: &RequestKey, response: &Response) {
        if let Err(e) = self
            .storage
            .put(&self.names.runtime_name, key, &response.snapshot())
            .await
        {
            tracing::warn!(namespace = %self.names.runtime_name, %key, error = %e, "cache write failed");
        }
    }
}

fn routed(response: Response, source: ResponseSource, classification: Classification) -> RoutedResponse {
    RoutedResponse { response, source, classification: Some(classification), refresh: None }
}
