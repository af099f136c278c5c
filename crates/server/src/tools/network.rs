//! network_set_online tool implementation.
//!
//! Flips the connectivity gate in front of the worker's network.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::state::AppState;

/// Parameters for the network_set_online tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NetworkSetOnlineParams {
    /// `false` makes every network fetch fail as if the device were offline.
    pub online: bool,
}

/// Output from the network_set_online tool.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkSetOnlineOutput {
    pub online: bool,
    /// Whether the status actually changed.
    pub changed: bool,
}

/// Implementation of the network_set_online tool.
pub async fn set_online_impl(state: &AppState, params: NetworkSetOnlineParams) -> Result<CallToolResult, McpError> {
    let changed = state.connectivity.set_online(params.online);

    json_result(&NetworkSetOnlineOutput { online: state.connectivity.is_online(), changed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{Site, output, state};

    #[tokio::test]
    async fn test_set_online_reports_changes() {
        let state = state(Site::with_shell(&[]));

        let out = output(&set_online_impl(&state, NetworkSetOnlineParams { online: false }).await.unwrap());
        assert_eq!(out["online"], false);
        assert_eq!(out["changed"], true);

        let out = output(&set_online_impl(&state, NetworkSetOnlineParams { online: false }).await.unwrap());
        assert_eq!(out["changed"], false);
        assert!(!state.connectivity.is_online());
    }

    #[tokio::test]
    async fn test_offline_blocks_install() {
        let state = state(Site::with_shell(&[]));
        set_online_impl(&state, NetworkSetOnlineParams { online: false }).await.unwrap();

        assert!(state.registration.update("v1").await.is_err());

        set_online_impl(&state, NetworkSetOnlineParams { online: true }).await.unwrap();
        assert!(state.registration.update("v1").await.is_ok());
    }
}
