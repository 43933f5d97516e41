//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the editor configuration
//! from the configuration file (~/.config/moveground/config.toml).

use crate::paths::MovegroundPaths;
use moveground_core::config::EditorConfig;
use moveground_core::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Configuration service that loads and caches the editor configuration.
///
/// The file is created with defaults when missing. Environment overrides
/// (`MOVEGROUND_API_URL`) are applied on every load and never written back.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<EditorConfig>>>,
}

impl ConfigService {
    /// Creates a service for the default config location.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(MovegroundPaths::new()?.config_file()))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    ///
    /// An unreadable or invalid file falls back to defaults (with overrides)
    /// and is logged; it is not cached, so a fixed file is picked up on the
    /// next call.
    pub fn get_config(&self) -> EditorConfig {
        {
            let read_lock = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        match Self::load_from(&self.path) {
            Ok(loaded) => {
                let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
                *write_lock = Some(loaded.clone());
                loaded
            }
            Err(e) => {
                tracing::warn!(path = ?self.path, "Failed to load config, using defaults: {}", e);
                let mut config = EditorConfig::default();
                config.apply_env_overrides(|key| std::env::var(key).ok());
                config
            }
        }
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = None;
    }

    /// Loads the config at `path`, writing defaults first if it is missing.
    pub fn load_from(path: &Path) -> Result<EditorConfig> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)?;
            toml::from_str::<EditorConfig>(&content)?
        } else {
            let default_config = EditorConfig::default();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, toml::to_string_pretty(&default_config)?)?;
            tracing::info!(path = ?path, "Created default config");
            default_config
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }
}
