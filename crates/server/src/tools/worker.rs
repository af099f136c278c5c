//! Worker lifecycle tools: worker_update, worker_skip_waiting, worker_status.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_client::{RegistrationStatus, UpdateOutcome};

use super::json_result;
use crate::state::AppState;

/// Parameters for the worker_update tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct WorkerUpdateParams {
    /// Version literal for the new generation. Defaults to the configured
    /// cache version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Output from the worker_update tool.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerUpdateOutput {
    pub outcome: UpdateOutcome,
    pub status: RegistrationStatus,
}

/// Output from the worker_skip_waiting tool.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerSkipWaitingOutput {
    /// Whether a waiting generation was activated.
    pub activated: bool,
    pub status: RegistrationStatus,
}

/// Implementation of the worker_update tool.
pub async fn update_impl(state: &AppState, params: WorkerUpdateParams) -> Result<CallToolResult, McpError> {
    let version = params.version.unwrap_or_else(|| state.config.cache_version.clone());

    let outcome = state.registration.update(version.trim()).await?;
    let status = state.registration.status().await;

    json_result(&WorkerUpdateOutput { outcome, status })
}

/// Implementation of the worker_skip_waiting tool.
///
/// Posts the same control message a page would send.
pub async fn skip_waiting_impl(state: &AppState) -> Result<CallToolResult, McpError> {
    let activated = state.registration.post_message("skipWaiting").await?;
    let status = state.registration.status().await;

    json_result(&WorkerSkipWaitingOutput { activated, status })
}

/// Implementation of the worker_status tool.
pub async fn status_impl(state: &AppState) -> Result<CallToolResult, McpError> {
    json_result(&state.registration.status().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{Site, output, state};

    #[tokio::test]
    async fn test_update_defaults_to_configured_version() {
        let state = state(Site::with_shell(&[]));

        let result = update_impl(&state, WorkerUpdateParams::default()).await.unwrap();
        let out = output(&result);

        assert_eq!(out["outcome"]["version"], "v1");
        assert_eq!(out["outcome"]["state"], "active");
        assert_eq!(out["status"]["active"]["names"]["static_name"], "portfolio-cache-v1");
    }

    #[tokio::test]
    async fn test_update_to_new_version_purges() {
        let state = state(Site::with_shell(&[]));
        update_impl(&state, WorkerUpdateParams::default()).await.unwrap();

        let params = WorkerUpdateParams { version: Some("v2".into()) };
        let out = output(&update_impl(&state, params).await.unwrap());

        assert_eq!(out["outcome"]["purged"], serde_json::json!(["portfolio-cache-v1"]));
        assert_eq!(state.storage.keys().await.unwrap(), vec!["portfolio-cache-v2"]);
    }

    #[tokio::test]
    async fn test_update_install_failure_is_an_error() {
        let state = state(Site::with_shell(&[]));
        state.connectivity.set_online(false);

        let err = update_impl(&state, WorkerUpdateParams::default()).await.unwrap_err();
        assert_eq!(err.code.0, -32010);

        let out = output(&status_impl(&state).await.unwrap());
        assert!(out["active"].is_null());
        assert!(out["installing"].is_null());
    }

    #[tokio::test]
    async fn test_skip_waiting_without_waiting_generation() {
        let state = state(Site::with_shell(&[]));
        update_impl(&state, WorkerUpdateParams::default()).await.unwrap();

        for _ in 0..2 {
            let out = output(&skip_waiting_impl(&state).await.unwrap());
            assert_eq!(out["activated"], false);
            assert_eq!(out["status"]["active"]["version"], "v1");
        }
    }

    #[tokio::test]
    async fn test_status_reports_scope_and_clients() {
        let state = state(Site::with_shell(&[]));

        let out = output(&status_impl(&state).await.unwrap());
        assert_eq!(out["scope"], "https://folio.test/");
        assert_eq!(out["script_url"], "https://folio.test/sw.js");
        assert_eq!(out["clients"], 0);
    }
}
