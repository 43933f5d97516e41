//! Trailing-edge debounced persistence of the editor buffer.

use moveground_core::config::PersistenceConfig;
use moveground_core::error::MovegroundError;
use moveground_core::storage::KeyValueStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;

/// Called with every storage failure, after it has been logged.
pub type PersistenceErrorHandler = Arc<dyn Fn(&MovegroundError) + Send + Sync>;

enum Command {
    Observe(Option<String>),
    Flush(oneshot::Sender<()>),
}

/// Commits the settled value of a rapidly changing text to one storage key.
///
/// Every [`observe`](Self::observe) rearms a quiet-period timer; only when it
/// fires is the last observed value written. An empty or absent value
/// removes the key instead.
///
/// The timer runs on a background task owned by this handle. Dropping the
/// handle (or calling [`shutdown`](Self::shutdown)) discards an unsettled
/// value, as an unmount would.
pub struct DebouncedPersistence {
    key: String,
    tx: mpsc::UnboundedSender<Command>,
    cancel: CancellationToken,
}

impl DebouncedPersistence {
    /// Spawns the debounce task. Must be called inside a tokio runtime.
    pub fn spawn(
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        quiet_period: Duration,
        on_error: Option<PersistenceErrorHandler>,
    ) -> Self {
        let key = key.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let worker = Worker {
            store,
            key: key.clone(),
            quiet_period,
            on_error,
        };
        tokio::spawn(worker.run(rx, cancel.clone()));

        Self { key, tx, cancel }
    }

    pub fn from_config(
        store: Arc<dyn KeyValueStore>,
        config: &PersistenceConfig,
        on_error: Option<PersistenceErrorHandler>,
    ) -> Self {
        Self::spawn(store, config.key.clone(), config.quiet_period(), on_error)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Records the current value and restarts the quiet period.
    pub fn observe(&self, value: Option<&str>) {
        if self
            .tx
            .send(Command::Observe(value.map(str::to_string)))
            .is_err()
        {
            tracing::debug!(target: "persistence", key = %self.key, "Observe after shutdown ignored");
        }
    }

    /// Commits any unsettled value now and waits for the write to finish.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }

    /// Stops the task, discarding any unsettled value.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for DebouncedPersistence {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct Worker {
    store: Arc<dyn KeyValueStore>,
    key: String,
    quiet_period: Duration,
    on_error: Option<PersistenceErrorHandler>,
}

impl Worker {
    async fn run(self, mut rx: mpsc::UnboundedReceiver<Command>, cancel: CancellationToken) {
        // `None` = nothing pending; `Some(None)` = pending removal.
        let mut pending: Option<Option<String>> = None;
        let timer = sleep(self.quiet_period);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    if pending.is_some() {
                        tracing::debug!(target: "persistence", key = %self.key, "Discarding unsettled value");
                    }
                    break;
                }
                command = rx.recv() => match command {
                    Some(Command::Observe(value)) => {
                        pending = Some(value);
                        timer.as_mut().reset(Instant::now() + self.quiet_period);
                    }
                    Some(Command::Flush(done)) => {
                        if let Some(value) = pending.take() {
                            self.commit(value.as_deref()).await;
                        }
                        let _ = done.send(());
                    }
                    None => break,
                },
                _ = &mut timer, if pending.is_some() => {
                    if let Some(value) = pending.take() {
                        self.commit(value.as_deref()).await;
                    }
                }
            }
        }

        tracing::debug!(target: "persistence", key = %self.key, "Persistence task stopped");
    }

    async fn commit(&self, value: Option<&str>) {
        let result = match value.filter(|v| !v.is_empty()) {
            Some(value) => {
                tracing::debug!(target: "persistence", key = %self.key, len = value.len(), "Committing settled value");
                self.store.set(&self.key, value).await
            }
            None => {
                tracing::debug!(target: "persistence", key = %self.key, "Settled value empty, removing entry");
                self.store.remove(&self.key).await
            }
        };

        if let Err(e) = result {
            tracing::warn!(target: "persistence", key = %self.key, "Failed to persist buffer: {}", e);
            if let Some(on_error) = &self.on_error {
                on_error(&e);
            }
        }
    }
}
