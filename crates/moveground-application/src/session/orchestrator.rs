use super::sequence::{SequenceGuard, Ticket};
use crate::import_resolver::RemoteImportResolver;
use crate::layout_controller::{LayoutModeController, LayoutObserver};
use crate::persistence::DebouncedPersistence;
use crate::request_cache::RequestCache;
use futures::Stream;
use moveground_core::code::{BuildType, CodeRequest, OperationKind, ShareLinks};
use moveground_core::error::MovegroundError;
use moveground_core::layout::LayoutMode;
use moveground_core::location::{ImportReference, PageLocation};
use moveground_core::session::{
    ActiveView, FORMAT_FAILURE_MESSAGE, FORMAT_SUCCESS_MESSAGE, Notice, Session, ShareState,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, watch};
use tokio::task::{AbortHandle, JoinHandle};

/// How a dispatched build, format or share ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    /// The result was applied to the session
    Applied,
    /// A newer dispatch of the same kind was issued; the result was dropped
    Stale,
    /// The call failed; the session shows the failure where applicable
    Failed(MovegroundError),
}

impl OperationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Result of the one-time import at mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The page carried no import reference
    NoReference,
    /// The referenced code replaced the buffer
    Applied(ImportReference),
    /// The share id did not resolve; the buffer is unchanged
    NotFound { share_id: String },
    /// `mount` had already run for this session
    AlreadyMounted,
    /// The session was shut down before resolution finished
    Cancelled,
}

/// Import work started by [`SessionOrchestrator::mount`].
pub enum Mount {
    /// Resolved synchronously (fragment, nothing to import, or repeat mount)
    Ready(ImportOutcome),
    /// A share id is being fetched in the background
    Resolving(JoinHandle<ImportOutcome>),
}

impl Mount {
    /// Waits for the import to settle.
    pub async fn outcome(self) -> ImportOutcome {
        match self {
            Self::Ready(outcome) => outcome,
            Self::Resolving(handle) => handle.await.unwrap_or_else(|e| {
                tracing::debug!(target: "import", "Import task ended early: {}", e);
                ImportOutcome::Cancelled
            }),
        }
    }
}

pub(super) struct Inner {
    pub(super) session: watch::Sender<Session>,
    pub(super) cache: RequestCache,
    pub(super) resolver: RemoteImportResolver,
    pub(super) persistence: Option<DebouncedPersistence>,
    pub(super) layout: Arc<LayoutModeController>,
    pub(super) sequences: SequenceGuard,
    pub(super) notices: broadcast::Sender<Notice>,
    pub(super) playground_origin: String,
    pub(super) mounted: AtomicBool,
    pub(super) import_task: Mutex<Option<AbortHandle>>,
}

/// Owns one editor session and drives it through edits, remote operations,
/// the mount-time import and layout changes.
///
/// State changes are applied synchronously and published on a watch channel
/// ([`subscribe`](Self::subscribe)); transient events go out on a broadcast
/// channel ([`subscribe_notices`](Self::subscribe_notices)). Failures are
/// recovered here and never end the session.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct SessionOrchestrator {
    inner: Arc<Inner>,
}

impl SessionOrchestrator {
    pub(super) fn from_inner(inner: Inner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    // ============================================================================
    // Read-only state
    // ============================================================================

    /// A copy of the current session state.
    pub fn snapshot(&self) -> Session {
        self.inner.session.borrow().clone()
    }

    /// Receives every session state change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.session.subscribe()
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.inner.notices.subscribe()
    }

    pub fn session_id(&self) -> String {
        self.inner.session.borrow().id.clone()
    }

    pub fn cache(&self) -> &RequestCache {
        &self.inner.cache
    }

    // ============================================================================
    // Editing
    // ============================================================================

    /// Replaces the buffer. Operations already in flight keep the payload they
    /// were dispatched with.
    pub fn edit_buffer(&self, text: impl Into<String>) {
        let text = text.into();
        if let Some(persistence) = &self.inner.persistence {
            persistence.observe(Some(&text));
        }
        self.inner.session.send_modify(|session| session.buffer = text);
    }

    // ============================================================================
    // Remote operations
    // ============================================================================

    /// Compiles the buffer, running its tests when `is_test` is set.
    ///
    /// The output is cleared and the Output view shown at dispatch. On
    /// success the output becomes stdout and stderr joined by a newline; on
    /// failure it stays empty.
    pub async fn build(&self, is_test: bool) -> OperationOutcome {
        let (ticket, buffer) = self.dispatch(OperationKind::Build, |session| {
            session.output = None;
            session.select_view(ActiveView::Output);
        });
        let request =
            CodeRequest::from_buffer(&buffer).with_build_type(BuildType::from_test_flag(is_test));
        tracing::info!(target: "session", module = %request.name, is_test, "Dispatching build");

        match self.inner.cache.build(&request).await {
            Ok(output) => {
                let combined = output.combined();
                applied_or_stale(self.finish(ticket, |session| session.output = Some(combined)))
            }
            Err(e) => {
                tracing::error!(target: "session", module = %request.name, "Build failed: {}", e);
                failed_or_stale(self.finish(ticket, |_| {}), e)
            }
        }
    }

    /// Formats the buffer.
    ///
    /// On success the buffer is replaced with the formatted text and the
    /// output shows a confirmation. On failure the output shows an error and
    /// the buffer is left as it was.
    pub async fn format(&self) -> OperationOutcome {
        let (ticket, buffer) = self.dispatch(OperationKind::Format, |session| {
            session.select_view(ActiveView::Output);
        });
        let request = CodeRequest::from_buffer(&buffer);
        tracing::info!(target: "session", module = %request.name, "Dispatching format");

        match self.inner.cache.format(&request).await {
            Ok(formatted) => {
                let applied = self.finish(ticket, |session| {
                    session.buffer = formatted.clone();
                    session.output = Some(FORMAT_SUCCESS_MESSAGE.to_string());
                });
                if applied {
                    if let Some(persistence) = &self.inner.persistence {
                        persistence.observe(Some(&formatted));
                    }
                }
                applied_or_stale(applied)
            }
            Err(e) => {
                tracing::warn!(target: "session", module = %request.name, "Format failed: {}", e);
                let applied = self.finish(ticket, |session| {
                    session.output = Some(FORMAT_FAILURE_MESSAGE.to_string());
                });
                failed_or_stale(applied, e)
            }
        }
    }

    /// Publishes the buffer and exposes the resulting links in
    /// [`Session::share`].
    pub async fn share(&self) -> OperationOutcome {
        let (ticket, buffer) = self.dispatch(OperationKind::Share, |session| {
            session.share = ShareState::Pending;
        });
        let request = CodeRequest::from_buffer(&buffer);
        tracing::info!(target: "session", module = %request.name, "Dispatching share");

        match self.inner.cache.share(&request).await {
            Ok(link) => {
                let links = ShareLinks::from_share(&self.inner.playground_origin, &link);
                applied_or_stale(self.finish(ticket, |session| session.share = ShareState::Ready(links)))
            }
            Err(e) => {
                tracing::warn!(target: "session", "Share failed: {}", e);
                let applied = self.finish(ticket, |session| session.share = ShareState::Failed);
                if applied {
                    self.notify(Notice::OperationFailed {
                        kind: OperationKind::Share,
                        message: e.to_string(),
                    });
                }
                failed_or_stale(applied, e)
            }
        }
    }

    /// Marks `kind` pending, applies `prepare`, and captures the payload
    /// source and a fresh ticket in the same state update.
    fn dispatch(&self, kind: OperationKind, prepare: impl FnOnce(&mut Session)) -> (Ticket, String) {
        let sequences = &self.inner.sequences;
        let mut ticket = Ticket { kind, seq: 0 };
        let mut buffer = String::new();
        self.inner.session.send_modify(|session| {
            session.begin_operation(kind);
            prepare(session);
            ticket = sequences.next(kind);
            buffer = session.buffer.clone();
        });
        (ticket, buffer)
    }

    /// Completes `ticket`, applying `apply` only if it is still the latest
    /// dispatch of its kind. Returns whether it was applied.
    fn finish(&self, ticket: Ticket, apply: impl FnOnce(&mut Session)) -> bool {
        let sequences = &self.inner.sequences;
        let mut current = false;
        self.inner.session.send_modify(|session| {
            session.finish_operation(ticket.kind);
            current = sequences.is_current(&ticket);
            if current {
                apply(session);
            }
        });
        if !current {
            tracing::debug!(
                target: "session",
                kind = %ticket.kind,
                seq = ticket.seq,
                latest = sequences.latest(ticket.kind),
                "Discarding stale response"
            );
        }
        current
    }

    // ============================================================================
    // View toggles
    // ============================================================================

    /// Shows the output panel on `view`.
    pub fn toggle_output_view(&self, view: ActiveView) {
        self.inner.session.send_modify(|session| session.select_view(view));
    }

    /// Hides the output panel if it shows Output, otherwise shows Output.
    /// Pending operations are not affected.
    pub fn toggle_terminal_visible(&self) {
        self.inner.session.send_modify(Session::toggle_terminal);
    }

    pub fn toggle_share_view(&self) {
        self.inner.session.send_modify(Session::toggle_share_view);
    }

    pub fn hide_output(&self) {
        self.inner.session.send_modify(Session::hide_output);
    }

    pub fn toggle_dark_mode(&self) {
        self.inner.session.send_modify(Session::toggle_dark_mode);
    }

    // ============================================================================
    // Mount-time import
    // ============================================================================

    /// Applies the page's import reference. Only the first call per session
    /// does anything.
    ///
    /// A fragment is applied before this returns. A share id is fetched in
    /// the background and overwrites the buffer when it arrives, even if the
    /// user edited in the meantime.
    pub fn mount(&self, location: &PageLocation) -> Mount {
        if self.inner.mounted.swap(true, Ordering::SeqCst) {
            tracing::debug!(target: "import", "Session already mounted");
            return Mount::Ready(ImportOutcome::AlreadyMounted);
        }

        match location.import_reference() {
            None => Mount::Ready(ImportOutcome::NoReference),
            Some(ImportReference::Fragment(code)) => {
                tracing::info!(target: "import", "Applying code from page fragment");
                self.edit_buffer(code.clone());
                Mount::Ready(ImportOutcome::Applied(ImportReference::Fragment(code)))
            }
            Some(reference) => {
                let orchestrator = self.clone();
                let handle =
                    tokio::spawn(async move { orchestrator.resolve_import(&reference).await });
                *self
                    .inner
                    .import_task
                    .lock()
                    .unwrap_or_else(|e| e.into_inner()) = Some(handle.abort_handle());
                Mount::Resolving(handle)
            }
        }
    }

    /// Resolves `reference` and applies it to the buffer.
    ///
    /// A share id that does not resolve raises one
    /// [`Notice::ImportNotFound`] and leaves the buffer unchanged.
    pub async fn resolve_import(&self, reference: &ImportReference) -> ImportOutcome {
        match self.inner.resolver.resolve(reference).await {
            Ok(code) => {
                self.edit_buffer(code);
                ImportOutcome::Applied(reference.clone())
            }
            Err(e) => {
                let share_id = match (&e, reference) {
                    (MovegroundError::ImportNotFound { share_id }, _) => share_id.clone(),
                    (_, ImportReference::ShareId(share_id)) => share_id.clone(),
                    (_, ImportReference::Fragment(_)) => String::new(),
                };
                self.notify(Notice::ImportNotFound {
                    share_id: share_id.clone(),
                });
                ImportOutcome::NotFound { share_id }
            }
        }
    }

    // ============================================================================
    // Layout
    // ============================================================================

    /// Applies one container width measurement.
    pub fn on_resize(&self, width: f64) -> LayoutMode {
        let mode = self.inner.layout.on_resize(width);
        apply_layout_mode(&self.inner.session, mode);
        mode
    }

    /// Follows container width measurements until the stream ends or the
    /// returned observer is dropped.
    pub fn observe_container<S>(&self, widths: S) -> LayoutObserver
    where
        S: Stream<Item = f64> + Send + 'static,
    {
        let inner = Arc::downgrade(&self.inner);
        self.inner.layout.observe_with(widths, move |mode| {
            if let Some(inner) = inner.upgrade() {
                apply_layout_mode(&inner.session, mode);
            }
        })
    }

    // ============================================================================
    // Lifecycle
    // ============================================================================

    /// Writes any unsettled buffer change now.
    pub async fn flush_persistence(&self) {
        if let Some(persistence) = &self.inner.persistence {
            persistence.flush().await;
        }
    }

    /// Unmounts: stops persistence (dropping an unsettled change) and
    /// cancels a pending import.
    pub fn shutdown(&self) {
        if let Some(persistence) = &self.inner.persistence {
            persistence.shutdown();
        }
        if let Some(task) = self
            .inner
            .import_task
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            task.abort();
        }
        tracing::debug!(target: "session", id = %self.inner.session.borrow().id, "Session shut down");
    }

    fn notify(&self, notice: Notice) {
        tracing::debug!(target: "session", "Notice: {}", notice.message());
        // No subscribers is not an error.
        let _ = self.inner.notices.send(notice);
    }
}

fn applied_or_stale(applied: bool) -> OperationOutcome {
    if applied {
        OperationOutcome::Applied
    } else {
        OperationOutcome::Stale
    }
}

fn failed_or_stale(applied: bool, error: MovegroundError) -> OperationOutcome {
    if applied {
        OperationOutcome::Failed(error)
    } else {
        OperationOutcome::Stale
    }
}

fn apply_layout_mode(session: &watch::Sender<Session>, mode: LayoutMode) {
    session.send_if_modified(|session| {
        if session.layout_mode == mode {
            return false;
        }
        session.layout_mode = mode;
        true
    });
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
