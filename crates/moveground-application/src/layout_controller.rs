//! Continuous width observation to layout mode.

use futures::{Stream, StreamExt};
use moveground_core::layout::LayoutMode;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Derives the [`LayoutMode`] from container width measurements.
///
/// Every measurement recomputes the mode; there is no debounce or hysteresis,
/// so widths oscillating around the breakpoint flip the mode each time.
pub struct LayoutModeController {
    mode: watch::Sender<LayoutMode>,
}

impl LayoutModeController {
    pub fn new(initial: LayoutMode) -> Self {
        let (mode, _) = watch::channel(initial);
        Self { mode }
    }

    /// Applies one resize notification and returns the resulting mode.
    pub fn on_resize(&self, width: f64) -> LayoutMode {
        let mode = LayoutMode::from_width(width);
        self.mode.send_if_modified(|current| {
            if *current == mode {
                return false;
            }
            tracing::debug!(target: "session", width, ?mode, "Layout mode changed");
            *current = mode;
            true
        });
        mode
    }

    pub fn mode(&self) -> LayoutMode {
        *self.mode.borrow()
    }

    /// Receives every mode change.
    pub fn subscribe(&self) -> watch::Receiver<LayoutMode> {
        self.mode.subscribe()
    }

    /// Feeds a stream of resize measurements into this controller until the
    /// stream ends or the returned observer is dropped.
    pub fn observe<S>(self: &Arc<Self>, widths: S) -> LayoutObserver
    where
        S: Stream<Item = f64> + Send + 'static,
    {
        self.observe_with(widths, |_| {})
    }

    /// Like [`observe`](Self::observe), calling `on_mode` with the mode
    /// computed for every measurement.
    pub fn observe_with<S, F>(self: &Arc<Self>, widths: S, on_mode: F) -> LayoutObserver
    where
        S: Stream<Item = f64> + Send + 'static,
        F: Fn(LayoutMode) + Send + 'static,
    {
        let controller = self.clone();
        let task = tokio::spawn(async move {
            let mut widths = Box::pin(widths);
            while let Some(width) = widths.next().await {
                on_mode(controller.on_resize(width));
            }
        });
        LayoutObserver { task: Some(task) }
    }
}

impl Default for LayoutModeController {
    fn default() -> Self {
        Self::new(LayoutMode::default())
    }
}

/// A live width observation. Dropping it stops observing.
pub struct LayoutObserver {
    task: Option<JoinHandle<()>>,
}

impl LayoutObserver {
    /// Stops observing now.
    pub fn disconnect(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_connected(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for LayoutObserver {
    fn drop(&mut self) {
        self.disconnect();
    }
}
