//! cache_keys tool implementation.
//!
//! Lists namespaces, or the request keys stored in one namespace.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::{CacheStorage, Error, RequestKey};

use crate::tools::json_result;

/// Parameters for the cache_keys tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeysParams {
    /// Namespace to list. When omitted, namespace names are listed instead.
    #[serde(default)]
    pub namespace: Option<String>,
}

/// Output from the cache_keys tool.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CacheKeysOutput {
    Namespaces { namespaces: Vec<String> },
    Entries { namespace: String, keys: Vec<RequestKey> },
}

/// Implementation of the cache_keys tool.
pub async fn keys_impl(storage: &dyn CacheStorage, params: CacheKeysParams) -> Result<CallToolResult, McpError> {
    let output = match params.namespace {
        None => CacheKeysOutput::Namespaces { namespaces: storage.keys().await? },
        Some(namespace) => {
            if !storage.has(&namespace).await? {
                return Err(Error::CacheMiss(format!("no namespace named {namespace}")).into());
            }
            let keys = storage.entry_keys(&namespace).await?;
            CacheKeysOutput::Entries { namespace, keys }
        }
    };

    json_result(&output)
}
