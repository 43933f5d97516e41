//! Unified path management for moveground files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/moveground/        # Config directory (platform config dir)
//! ├── config.toml              # Editor configuration
//! └── storage.json             # Durable key/value entries (persisted buffers)
//! ```

use moveground_core::error::{MovegroundError, Result};
use std::path::PathBuf;

const APP_DIR: &str = "moveground";

/// Resolves moveground file locations under a base directory.
#[derive(Debug, Clone)]
pub struct MovegroundPaths {
    base: PathBuf,
}

impl MovegroundPaths {
    /// Paths under the platform config directory
    /// (`$XDG_CONFIG_HOME` or `~/.config` on Linux).
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| MovegroundError::config("Cannot find config directory"))?;
        Ok(Self::with_base(config_dir.join(APP_DIR)))
    }

    /// Paths under an explicit directory.
    pub fn with_base(base: PathBuf) -> Self {
        Self { base }
    }

    pub fn config_dir(&self) -> &PathBuf {
        &self.base
    }

    pub fn config_file(&self) -> PathBuf {
        self.base.join("config.toml")
    }

    pub fn storage_file(&self) -> PathBuf {
        self.base.join("storage.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_live_under_base() {
        let paths = MovegroundPaths::with_base(PathBuf::from("/tmp/mg"));
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/mg/config.toml"));
        assert_eq!(paths.storage_file(), PathBuf::from("/tmp/mg/storage.json"));
    }

    #[test]
    fn test_default_base_is_app_dir() {
        if let Ok(paths) = MovegroundPaths::new() {
            assert!(paths.config_dir().ends_with("moveground"));
        }
    }
}
