use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.playmove.dev";
pub const DEFAULT_GIST_API_URL: &str = "https://api.github.com";
pub const DEFAULT_PLAYGROUND_ORIGIN: &str = "https://playmove.dev";
pub const DEFAULT_STORAGE_KEY: &str = "moveground.code";

/// Environment variable overriding [`EditorConfig::api_url`].
pub const API_URL_ENV: &str = "MOVEGROUND_API_URL";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    /// Base URL of the build/format/share service
    pub api_url: String,
    /// Base URL of the gist API used for imports
    pub gist_api_url: String,
    /// Origin used when building "open in playground" share links
    pub playground_origin: String,
    pub request_timeout_secs: u64,
    pub dark_mode: bool,
    pub read_only: bool,
    pub persistence: PersistenceConfig,
    pub cache: CacheConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            gist_api_url: DEFAULT_GIST_API_URL.to_string(),
            playground_origin: DEFAULT_PLAYGROUND_ORIGIN.to_string(),
            request_timeout_secs: 30,
            dark_mode: false,
            read_only: false,
            persistence: PersistenceConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl EditorConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Applies environment overrides read through `lookup`, usually
    /// `|key| std::env::var(key).ok()`. Blank values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|url| !url.trim().is_empty()) {
            self.api_url = url.trim().to_string();
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PersistenceConfig {
    pub enabled: bool,
    /// Storage key namespace for the buffer
    pub key: String,
    /// Quiet interval before a buffer change is committed
    pub quiet_period_ms: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            key: DEFAULT_STORAGE_KEY.to_string(),
            quiet_period_ms: 1000,
        }
    }
}

impl PersistenceConfig {
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of memoized responses. `0` disables eviction.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}
