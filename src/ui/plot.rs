use eframe::egui::{Color32, Ui};
use egui_plot::{Line, Plot, PlotPoints};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Route chart (result view)
// ---------------------------------------------------------------------------

/// Plot the chart columns of the loaded CSV, if any.
pub fn route_plot(ui: &mut Ui, state: &AppState) {
    let points = state.chart_points();
    if points.is_empty() {
        return;
    }

    let keys = &state.settings.chart;
    let points: PlotPoints = points.into_iter().collect();

    Plot::new("route_plot")
        .legend(egui_plot::Legend::default())
        .x_axis_label(keys.x.as_str())
        .y_axis_label(keys.y.as_str())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            let line = Line::new(points)
                .name(&keys.y)
                .color(Color32::from_rgb(30, 144, 255))
                .width(1.5);
            plot_ui.line(line);
        });
}
