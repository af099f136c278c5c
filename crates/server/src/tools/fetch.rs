//! worker_fetch tool implementation.
//!
//! Dispatches a fetch event through the registration, exactly as a page
//! request would be, and reports where the response came from.

use std::collections::BTreeMap;

use chrono::Utc;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::fetch::resolve;
use swcache_client::{Classification, ResponseSource};
use swcache_core::{Destination, Request, RequestMode};

use super::json_result;
use crate::error::ToolError;
use crate::state::AppState;

/// Input parameters for worker_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerFetchParams {
    /// Request URL, absolute or relative to the registration scope.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request mode: "navigate", "same-origin", "no-cors" (default) or "cors".
    #[serde(default)]
    pub mode: Option<String>,

    /// Request destination: "document", "style", "script", "image", "font"...
    #[serde(default)]
    pub destination: Option<String>,

    /// Maximum body characters to include in the output (default: 2000).
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

fn default_method() -> String {
    "GET".into()
}

fn default_preview_chars() -> usize {
    2000
}

/// Output structure for worker_fetch tool.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerFetchOutput {
    /// The resolved request URL.
    pub url: String,
    /// Where the response came from.
    pub source: ResponseSource,
    /// Routing tag; absent when the request was not intercepted.
    pub classification: Option<Classification>,
    pub status: u16,
    pub status_text: String,
    pub content_type: Option<String>,
    pub headers: BTreeMap<String, String>,
    /// Full body length in bytes.
    pub body_bytes: usize,
    /// Lossy UTF-8 preview of the body.
    pub body_preview: String,
    pub preview_truncated: bool,
    /// A background refresh of the cached entry was started.
    pub refreshing: bool,
    /// ISO8601 timestamp of when the response was served.
    pub served_at: String,
}

/// Implementation of the worker_fetch tool.
pub async fn fetch_impl(state: &AppState, params: WorkerFetchParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(ToolError::InvalidInput("url must not be empty".into()).into());
    }

    let url = resolve(state.registration.scope(), &params.url).map_err(swcache_core::Error::from)?;
    let mode: RequestMode = params.mode.as_deref().unwrap_or("no-cors").parse()?;
    let destination: Destination = match (params.destination.as_deref(), mode) {
        (Some(destination), _) => destination.parse()?,
        (None, RequestMode::Navigate) => Destination::Document,
        (None, _) => Destination::Empty,
    };

    let request = Request { mode, destination, ..Request::get(url) }.with_method(&params.method);
    let routed = state.registration.fetch(&request).await?;

    let body = String::from_utf8_lossy(&routed.response.body);
    let preview_truncated = body.chars().count() > params.preview_chars;
    let body_preview: String = body.chars().take(params.preview_chars).collect();

    let output = WorkerFetchOutput {
        url: request.url.to_string(),
        source: routed.source,
        classification: routed.classification,
        status: routed.response.status,
        status_text: routed.response.status_text.clone(),
        content_type: routed.response.header("content-type").map(str::to_string),
        headers: routed.response.headers.clone(),
        body_bytes: routed.response.body.len(),
        body_preview,
        preview_truncated,
        refreshing: routed.refresh.is_some(),
        served_at: Utc::now().to_rfc3339(),
    };

    json_result(&output)
}
