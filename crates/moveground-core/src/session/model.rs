//! Session domain model.
//!
//! This module contains the `Session` entity: the live state of one editor
//! instance. It is plain data plus pure state transitions; anything that
//! touches the network or storage lives in the application layer.

use crate::code::{OperationKind, ShareLinks, module_name};
use crate::layout::{LayoutMode, PanelLayout};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Text shown in the output pane before anything has run.
pub const OUTPUT_PLACEHOLDER: &str = "Run output will be visible here.";

/// Output after a successful format.
pub const FORMAT_SUCCESS_MESSAGE: &str = "Code formatted successfully.";

/// Output after a failed format.
pub const FORMAT_FAILURE_MESSAGE: &str = "Error formatting code.";

/// Buffer used when nothing was persisted and no initial code was supplied.
pub const WELCOME_CODE: &str = r#"module temp::temp;

public fun foo(): bool {
  true
}

#[test]
fun test() {
    std::debug::print(&b"Welcome to the playground!".to_string());
}
"#;

/// Which remote operation, if any, the session is waiting on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "kind")]
pub enum PendingOperation {
    #[default]
    None,
    Pending(OperationKind),
}

impl PendingOperation {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Tab shown in the output pane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActiveView {
    #[default]
    Output,
    ShareLinks,
}

/// Progress of the share flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "links")]
pub enum ShareState {
    #[default]
    NotRequested,
    Pending,
    Ready(ShareLinks),
    Failed,
}

/// The live, in-memory state of one editing instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique per mount (UUID format)
    pub id: String,
    /// Current editor text
    pub buffer: String,
    /// Output pane text; `None` until something produced output
    pub output: Option<String>,
    /// Most recently dispatched operation that is still in flight
    pub pending_operation: PendingOperation,
    pub active_view: ActiveView,
    /// Whether the user has the output pane open
    pub output_visible: bool,
    pub layout_mode: LayoutMode,
    pub dark_mode: bool,
    /// Passed through to the editing surface
    pub read_only: bool,
    pub share: ShareState,
    #[serde(default)]
    in_flight: BTreeMap<OperationKind, usize>,
}

impl Session {
    pub fn new(id: impl Into<String>, buffer: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            buffer: buffer.into(),
            output: None,
            pending_operation: PendingOperation::None,
            active_view: ActiveView::Output,
            output_visible: false,
            layout_mode: LayoutMode::Horizontal,
            dark_mode: false,
            read_only: false,
            share: ShareState::NotRequested,
            in_flight: BTreeMap::new(),
        }
    }

    pub fn with_dark_mode(mut self, dark_mode: bool) -> Self {
        self.dark_mode = dark_mode;
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Module name derived from the current buffer.
    pub fn module_name(&self) -> String {
        module_name(&self.buffer)
    }

    // ============================================================================
    // Pending-operation bookkeeping
    // ============================================================================

    /// Records a dispatch of `kind`; it becomes the pending operation.
    pub fn begin_operation(&mut self, kind: OperationKind) {
        *self.in_flight.entry(kind).or_insert(0) += 1;
        self.pending_operation = PendingOperation::Pending(kind);
    }

    /// Records the completion of one `kind` dispatch.
    ///
    /// When no dispatch of the current pending kind remains, another kind
    /// still in flight takes its place, otherwise the session is idle.
    pub fn finish_operation(&mut self, kind: OperationKind) {
        if let Some(count) = self.in_flight.get_mut(&kind) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.in_flight.remove(&kind);
            }
        }

        let current_still_running = match self.pending_operation {
            PendingOperation::Pending(current) => self.in_flight.contains_key(&current),
            PendingOperation::None => false,
        };
        if !current_still_running {
            self.pending_operation = self
                .in_flight
                .keys()
                .next()
                .copied()
                .map(PendingOperation::Pending)
                .unwrap_or_default();
        }
    }

    /// Number of dispatches of `kind` not yet finished.
    pub fn in_flight(&self, kind: OperationKind) -> usize {
        self.in_flight.get(&kind).copied().unwrap_or(0)
    }

    /// A build or format is running. Share is tracked separately in
    /// [`ShareState`].
    pub fn is_loading(&self) -> bool {
        self.in_flight(OperationKind::Build) > 0 || self.in_flight(OperationKind::Format) > 0
    }

    // ============================================================================
    // View toggles
    // ============================================================================

    /// Shows the output pane on `view`.
    pub fn select_view(&mut self, view: ActiveView) {
        self.active_view = view;
        self.output_visible = true;
    }

    /// Hides the pane if it is showing `view`, otherwise shows `view`.
    fn toggle_view(&mut self, view: ActiveView) {
        if self.output_visible && self.active_view == view {
            self.output_visible = false;
        } else {
            self.select_view(view);
        }
    }

    /// Terminal button.
    pub fn toggle_terminal(&mut self) {
        self.toggle_view(ActiveView::Output);
    }

    /// Share button.
    pub fn toggle_share_view(&mut self) {
        self.toggle_view(ActiveView::ShareLinks);
    }

    /// Hides the output pane. In-flight operations keep running.
    pub fn hide_output(&mut self) {
        self.output_visible = false;
    }

    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
    }

    // ============================================================================
    // Derived presentation state
    // ============================================================================

    /// The pane is open and has something to show.
    pub fn show_output_panel(&self) -> bool {
        let has_output = self.output.as_deref().is_some_and(|o| !o.is_empty());
        self.output_visible && (has_output || self.is_loading())
    }

    pub fn panel_layout(&self) -> PanelLayout {
        PanelLayout::compute(self.layout_mode, self.output_visible, self.show_output_panel())
    }

    /// Output text with the placeholder substituted for empty output.
    pub fn display_output(&self) -> &str {
        match self.output.as_deref() {
            Some(output) if !output.is_empty() => output,
            _ => OUTPUT_PLACEHOLDER,
        }
    }
}
