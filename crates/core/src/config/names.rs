//! Versioned namespace names.

use serde::{Deserialize, Serialize};

/// The two namespace names a generation treats as current.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CacheNames {
    /// Precached app shell.
    pub static_name: String,
    /// Entries accumulated while serving requests.
    pub runtime_name: String,
}

impl CacheNames {
    /// `{prefix}-cache-{version}` and `{prefix}-runtime-{version}`.
    pub fn versioned(prefix: &str, version: &str) -> Self {
        Self { static_name: format!("{prefix}-cache-{version}"), runtime_name: format!("{prefix}-runtime-{version}") }
    }

    /// Whether `name` is one of the current namespaces.
    pub fn is_current(&self, name: &str) -> bool {
        name == self.static_name || name == self.runtime_name
    }

    /// Lookup order for cached matches.
    pub fn lookup_order(&self) -> [&str; 2] {
        [self.static_name.as_str(), self.runtime_name.as_str()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versioned_names() {
        let names = CacheNames::versioned("portfolio", "v1");
        assert_eq!(names.static_name, "portfolio-cache-v1");
        assert_eq!(names.runtime_name, "portfolio-runtime-v1");
    }

    #[test]
    fn test_is_current() {
        let names = CacheNames::versioned("portfolio", "v2");
        assert!(names.is_current("portfolio-cache-v2"));
        assert!(names.is_current("portfolio-runtime-v2"));
        assert!(!names.is_current("portfolio-cache-v1"));
        assert!(!names.is_current("unrelated"));
    }
}
