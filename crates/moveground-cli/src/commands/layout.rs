use moveground_application::LayoutModeController;
use moveground_core::layout::PanelLayout;

/// Feeds `widths` through a layout controller in order, printing the pane
/// arrangement for each with the output panel open.
pub fn run(widths: &[f64]) {
    let controller = LayoutModeController::default();
    for &width in widths {
        let mode = controller.on_resize(width);
        let panels = PanelLayout::compute(mode, true, true);
        let minimums = match (panels.editor_min_height, panels.output_min_height) {
            (Some(editor), Some(output)) => format!(" min-height editor={}px output={}px", editor, output),
            _ => String::new(),
        };
        println!(
            "{:>8} {:?}: editor {}% / output {}%{}",
            width, mode, panels.editor_size, panels.output_size, minimums
        );
    }
}
