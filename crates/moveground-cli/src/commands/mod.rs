pub mod build;
pub mod format;
pub mod import;
pub mod layout;
pub mod share;

use anyhow::{Context, Result};
use moveground_application::{SessionFactory, SessionOrchestrator};
use moveground_core::config::EditorConfig;
use moveground_infrastructure::{
    ConfigService, FileKeyValueStore, GithubGistClient, HttpPlaygroundApi, MovegroundPaths,
};
use std::path::Path;
use std::sync::Arc;

/// Resolved configuration and locations for one CLI invocation.
pub struct Environment {
    pub config: EditorConfig,
    pub paths: MovegroundPaths,
}

impl Environment {
    /// Loads the config file (creating it if missing) and applies the
    /// command-line overrides.
    ///
    /// With `--config`, the buffer storage lives next to the given file.
    pub fn load(config_path: Option<&Path>, api_url: Option<&str>) -> Result<Self> {
        let (service, paths) = match config_path {
            Some(path) => {
                let base = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
                (
                    ConfigService::with_path(path.to_path_buf()),
                    MovegroundPaths::with_base(base),
                )
            }
            None => {
                let paths = MovegroundPaths::new()?;
                (ConfigService::new()?, paths)
            }
        };

        let mut config = service.get_config();
        if let Some(url) = api_url {
            config.api_url = url.to_string();
        }
        tracing::debug!(path = ?service.path(), api_url = %config.api_url, "Loaded config");

        Ok(Self { config, paths })
    }

    pub fn session_factory(&self) -> SessionFactory {
        SessionFactory::new(
            Arc::new(HttpPlaygroundApi::from_config(&self.config)),
            Arc::new(GithubGistClient::from_config(&self.config)),
            Arc::new(FileKeyValueStore::new(self.paths.storage_file())),
            self.config.clone(),
        )
    }

    /// Starts a session and types the contents of `file` into it.
    pub async fn open_file(&self, file: &Path) -> Result<SessionOrchestrator> {
        let code = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let session = self.session_factory().create_session(None).await;
        session.edit_buffer(code);
        Ok(session)
    }
}
