use super::orchestrator::{Inner, SessionOrchestrator};
use super::sequence::SequenceGuard;
use crate::import_resolver::RemoteImportResolver;
use crate::layout_controller::LayoutModeController;
use crate::persistence::{DebouncedPersistence, PersistenceErrorHandler};
use crate::request_cache::RequestCache;
use moveground_core::code::PlaygroundApi;
use moveground_core::config::EditorConfig;
use moveground_core::error::MovegroundError;
use moveground_core::gist::GistService;
use moveground_core::session::{Notice, Session, WELCOME_CODE};
use moveground_core::storage::KeyValueStore;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, watch};
use uuid::Uuid;

const NOTICE_CAPACITY: usize = 16;

/// Factory for creating [`SessionOrchestrator`] instances.
///
/// Every session created by one factory shares its [`RequestCache`], so an
/// identical request made from two sessions reaches the network once.
pub struct SessionFactory {
    /// Service for share-id imports
    gists: Arc<dyn GistService>,
    /// Durable storage for the buffer
    store: Arc<dyn KeyValueStore>,
    config: EditorConfig,
    cache: RequestCache,
}

impl SessionFactory {
    /// Creates a new SessionFactory.
    ///
    /// # Arguments
    ///
    /// * `api` - Build/format/share service
    /// * `gists` - Remote content store used to resolve share ids
    /// * `store` - Durable key/value storage for the buffer
    /// * `config` - Editor configuration; `cache.capacity` bounds the shared cache
    pub fn new(
        api: Arc<dyn PlaygroundApi>,
        gists: Arc<dyn GistService>,
        store: Arc<dyn KeyValueStore>,
        config: EditorConfig,
    ) -> Self {
        let cache = RequestCache::new(api, config.cache.capacity);
        Self {
            gists,
            store,
            config,
            cache,
        }
    }

    pub fn cache(&self) -> &RequestCache {
        &self.cache
    }

    /// Creates a session.
    ///
    /// # Arguments
    ///
    /// * `initial_code` - Buffer used when nothing was persisted
    ///
    /// # Returns
    ///
    /// An orchestrator whose buffer is the persisted entry (when persistence
    /// is enabled and an entry exists), else `initial_code`, else the
    /// welcome program.
    pub async fn create_session(&self, initial_code: Option<&str>) -> SessionOrchestrator {
        let session_id = Uuid::new_v4().to_string();
        let restored = self.restore_buffer().await;
        let buffer = restored
            .or_else(|| initial_code.map(str::to_string))
            .unwrap_or_else(|| WELCOME_CODE.to_string());

        let session = Session::new(session_id.clone(), buffer)
            .with_dark_mode(self.config.dark_mode)
            .with_read_only(self.config.read_only);
        let layout_mode = session.layout_mode;
        let (session_tx, _) = watch::channel(session);
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);

        let persistence = self.config.persistence.enabled.then(|| {
            let notices = notices.clone();
            let on_error: PersistenceErrorHandler = Arc::new(move |e: &MovegroundError| {
                let _ = notices.send(Notice::PersistenceFailed {
                    message: e.to_string(),
                });
            });
            DebouncedPersistence::from_config(
                self.store.clone(),
                &self.config.persistence,
                Some(on_error),
            )
        });

        tracing::debug!(
            target: "session",
            id = %session_id,
            persistence = persistence.is_some(),
            "Created session"
        );

        SessionOrchestrator::from_inner(Inner {
            session: session_tx,
            cache: self.cache.clone(),
            resolver: RemoteImportResolver::new(self.gists.clone()),
            persistence,
            layout: Arc::new(LayoutModeController::new(layout_mode)),
            sequences: SequenceGuard::new(),
            notices,
            playground_origin: self.config.playground_origin.clone(),
            mounted: AtomicBool::new(false),
            import_task: Mutex::new(None),
        })
    }

    /// Reads the persisted buffer. A read failure is logged and treated as
    /// nothing persisted.
    async fn restore_buffer(&self) -> Option<String> {
        if !self.config.persistence.enabled {
            return None;
        }
        let key = &self.config.persistence.key;
        match self.store.get(key).await {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(target: "persistence", %key, "Failed to restore buffer: {}", e);
                None
            }
        }
    }
}
