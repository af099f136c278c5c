//! cache_get tool implementation.
//!
//! Reads one stored response from a namespace.

use std::collections::BTreeMap;

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::fetch::resolve;
use swcache_core::{CacheStorage, Error, RequestKey};
use url::Url;

use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Namespace to read from (e.g., "portfolio-cache-v1").
    pub namespace: String,

    /// Request URL, absolute or relative to the registration scope.
    pub url: String,

    /// HTTP method of the stored request (default: GET).
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "GET".into()
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize)]
pub struct CacheGetOutput {
    pub namespace: String,
    pub key: RequestKey,
    /// URL the stored response was served from.
    pub response_url: String,
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    pub body_bytes: usize,
    /// Lossy UTF-8 rendering of the body.
    pub body: String,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(
    storage: &dyn CacheStorage, scope: &Url, params: CacheGetParams,
) -> Result<CallToolResult, McpError> {
    let url = resolve(scope, &params.url).map_err(Error::from)?;
    let key = RequestKey::new(&params.method, &url);

    let response = storage
        .match_in(&params.namespace, &key)
        .await?
        .ok_or_else(|| Error::CacheMiss(format!("{key} in {}", params.namespace)))?;

    let output = CacheGetOutput {
        namespace: params.namespace,
        key,
        body_bytes: response.body.len(),
        body: String::from_utf8_lossy(&response.body).into_owned(),
        response_url: response.url,
        status: response.status,
        status_text: response.status_text,
        headers: response.headers,
    };

    json_result(&output)
}
