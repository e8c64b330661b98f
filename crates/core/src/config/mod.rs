//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (LANTERN_*)
//! 2. TOML config file (if LANTERN_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::StoreRole;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (LANTERN_*)
/// 2. TOML config file (if LANTERN_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via LANTERN_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Origin the application is served from.
    ///
    /// Relative request URLs and manifest paths resolve against it, and
    /// responses from it are treated as same-origin.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Version tag of the static asset store. Bump to evict it on next activation.
    #[serde(default = "default_version")]
    pub static_cache_version: String,

    /// Version tag of the API response store. Bump to evict it on next activation.
    #[serde(default = "default_version")]
    pub api_cache_version: String,

    /// Assets fetched into the static store at install time.
    #[serde(default = "default_precache_manifest")]
    pub precache_manifest: Vec<String>,

    /// Document served from the static store when navigation fails.
    #[serde(default = "default_offline_document")]
    pub offline_document: String,

    /// Path regexes of API routes that require authentication (network-first).
    #[serde(default = "default_credentialed_patterns")]
    pub credentialed_patterns: Vec<String>,

    /// Path regexes of all other API routes (cache-first with revalidation).
    #[serde(default = "default_api_patterns")]
    pub api_patterns: Vec<String>,

    /// URL substrings purged from the API store on `INVALIDATE_CONTENT_CACHE`.
    #[serde(default = "default_invalidation_patterns")]
    pub invalidation_patterns: Vec<String>,

    /// Request headers that are part of API request identities. Static and
    /// document entries are keyed by method and URL only.
    #[serde(default)]
    pub vary_headers: Vec<String>,

    /// Message placed in the synthetic offline JSON body.
    #[serde(default = "default_offline_message")]
    pub offline_message: String,

    /// User-Agent string for upstream requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Transport-level timeout of the host HTTP client, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./lantern-cache.sqlite")
}

fn default_origin() -> String {
    "http://localhost:3000".into()
}

fn default_version() -> String {
    "v1".into()
}

fn default_precache_manifest() -> Vec<String> {
    ["/static/js/bundle.js", "/static/css/main.css", "/manifest.json", "/favicon.ico", "/logo192.png", "/logo512.png"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_offline_document() -> String {
    "/offline.html".into()
}

fn default_credentialed_patterns() -> Vec<String> {
    ["^/api/contents/", "^/api/categories/", "^/api/review/", "^/api/analytics/", "^/api/profile/"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_api_patterns() -> Vec<String> {
    vec!["^/api/".into()]
}

fn default_invalidation_patterns() -> Vec<String> {
    vec!["/api/contents/".into(), "/api/categories/".into()]
}

fn default_offline_message() -> String {
    "You are offline. Please check your network connection and try again.".into()
}

fn default_user_agent() -> String {
    "lantern/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            origin: default_origin(),
            static_cache_version: default_version(),
            api_cache_version: default_version(),
            precache_manifest: default_precache_manifest(),
            offline_document: default_offline_document(),
            credentialed_patterns: default_credentialed_patterns(),
            api_patterns: default_api_patterns(),
            invalidation_patterns: default_invalidation_patterns(),
            vary_headers: Vec::new(),
            offline_message: default_offline_message(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Name of the current store for `role`, e.g. `api:v1`.
    pub fn store_name(&self, role: StoreRole) -> String {
        match role {
            StoreRole::Static => role.versioned(&self.static_cache_version),
            StoreRole::Api => role.versioned(&self.api_cache_version),
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `LANTERN_`
    /// 2. TOML file from `LANTERN_CONFIG_FILE` (if set)
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

        if let Ok(config_path) = std::env::var("LANTERN_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        Self::extract(figment.merge(
            Env::prefixed("LANTERN_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        ))
    }

    /// Load defaults overlaid with a TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        Self::extract(Figment::from(Serialized::defaults(Self::default())).merge(Toml::string(toml)))
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
