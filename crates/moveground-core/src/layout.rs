//! Layout mode and panel proportions.

use serde::{Deserialize, Serialize};

/// Container width below which panels stack vertically.
pub const VERTICAL_BREAKPOINT: f64 = 600.0;

/// Panel arrangement of the editor and output panes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutMode {
    /// Side by side
    #[default]
    Horizontal,
    /// Stacked
    Vertical,
}

impl LayoutMode {
    /// Derives the mode from a measured container width.
    ///
    /// No hysteresis: the breakpoint itself is horizontal, anything below it
    /// is vertical. Non-finite widths are treated as zero.
    pub fn from_width(width: f64) -> Self {
        if width.is_finite() && width >= VERTICAL_BREAKPOINT {
            Self::Horizontal
        } else {
            Self::Vertical
        }
    }
}

/// Default sizes (percent) and minimum heights (pixels) of the two panes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelLayout {
    pub mode: LayoutMode,
    pub editor_size: u8,
    pub output_size: u8,
    pub editor_min_height: Option<u32>,
    pub output_min_height: Option<u32>,
    /// Whether the drag handle between panes is rendered
    pub show_resize_handle: bool,
}

impl PanelLayout {
    /// Computes pane proportions.
    ///
    /// `output_visible` is the user-controlled panel toggle;
    /// `show_output_panel` additionally requires something to show (output
    /// text or a running operation).
    pub fn compute(mode: LayoutMode, output_visible: bool, show_output_panel: bool) -> Self {
        match mode {
            LayoutMode::Horizontal => Self {
                mode,
                editor_size: if show_output_panel { 65 } else { 100 },
                output_size: 35,
                editor_min_height: None,
                output_min_height: None,
                show_resize_handle: output_visible,
            },
            LayoutMode::Vertical => Self {
                mode,
                editor_size: 100,
                output_size: 100,
                editor_min_height: Some(300),
                output_min_height: Some(250),
                show_resize_handle: false,
            },
        }
    }
}
