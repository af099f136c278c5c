//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SWCACHE_*)
//! 2. TOML config file (if SWCACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod names;
mod validation;

pub use names::CacheNames;
pub use validation::ConfigError;

/// App-shell assets precached at install time.
pub const DEFAULT_STATIC_ASSETS: &[&str] = &["./", "./index.html", "./favicon.svg", "./resume.pdf"];

/// Cross-origin font hosts served cache-first.
pub const DEFAULT_FONT_HOSTS: &[&str] = &["fonts.googleapis.com", "fonts.gstatic.com"];

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SWCACHE_*)
/// 2. TOML config file (if SWCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via SWCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to buffer per response.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Registration scope; relative asset paths resolve against it.
    ///
    /// Set via SWCACHE_SCOPE environment variable.
    #[serde(default = "default_scope")]
    pub scope: String,

    /// Worker script path, relative to the scope.
    #[serde(default = "default_script_path")]
    pub script_path: String,

    /// Leading part of every namespace name.
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Version literal embedded in namespace names. Bumping it invalidates
    /// every namespace of the previous deployment on activation.
    ///
    /// Set via SWCACHE_CACHE_VERSION environment variable.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// App-shell asset list.
    #[serde(default = "default_static_assets")]
    pub static_assets: Vec<String>,

    /// Document served when a navigation fails offline with no cached match.
    #[serde(default = "default_shell_document")]
    pub shell_document: String,

    /// Font-provider hosts (cache-first, no refresh).
    #[serde(default = "default_font_hosts")]
    pub font_hosts: Vec<String>,

    /// Activate a freshly installed generation without waiting for open
    /// pages to close.
    #[serde(default = "default_true")]
    pub skip_waiting_on_install: bool,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./swcache.sqlite")
}

fn default_user_agent() -> String {
    "swcache/0.1".into()
}

fn default_max_bytes() -> usize {
    10_485_760 // 10MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_scope() -> String {
    "http://localhost:5173/".into()
}

fn default_script_path() -> String {
    "sw.js".into()
}

fn default_cache_prefix() -> String {
    "portfolio".into()
}

fn default_cache_version() -> String {
    "v1".into()
}

fn default_static_assets() -> Vec<String> {
    DEFAULT_STATIC_ASSETS.iter().map(|s| s.to_string()).collect()
}

fn default_shell_document() -> String {
    "./index.html".into()
}

fn default_font_hosts() -> Vec<String> {
    DEFAULT_FONT_HOSTS.iter().map(|s| s.to_string()).collect()
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            scope: default_scope(),
            script_path: default_script_path(),
            cache_prefix: default_cache_prefix(),
            cache_version: default_cache_version(),
            static_assets: default_static_assets(),
            shell_document: default_shell_document(),
            font_hosts: default_font_hosts(),
            skip_waiting_on_install: true,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Namespace names for the configured version.
    pub fn cache_names(&self) -> CacheNames {
        CacheNames::versioned(&self.cache_prefix, &self.cache_version)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SWCACHE_`
    /// 2. TOML file from `SWCACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SWCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SWCACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./swcache.sqlite"));
        assert_eq!(config.user_agent, "swcache/0.1");
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.static_assets, vec!["./", "./index.html", "./favicon.svg", "./resume.pdf"]);
        assert_eq!(config.shell_document, "./index.html");
        assert_eq!(config.font_hosts, vec!["fonts.googleapis.com", "fonts.gstatic.com"]);
        assert!(config.skip_waiting_on_install);
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_cache_names_follow_version() {
        let config = AppConfig { cache_version: "v2".into(), ..Default::default() };
        let names = config.cache_names();
        assert_eq!(names.static_name, "portfolio-cache-v2");
        assert_eq!(names.runtime_name, "portfolio-runtime-v2");
    }

    #[test]
    fn test_load_from_toml_and_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "swcache.toml",
                r#"
                cache_version = "v7"
                static_assets = ["./", "./index.html"]
                "#,
            )?;
            jail.set_env("SWCACHE_CONFIG_FILE", "swcache.toml");
            jail.set_env("SWCACHE_CACHE_PREFIX", "folio");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.cache_version, "v7");
            assert_eq!(config.cache_prefix, "folio");
            assert_eq!(config.static_assets.len(), 2);
            Ok(())
        });
    }
}
