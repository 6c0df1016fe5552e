mod app;
mod config;
mod data;
mod report;
mod state;
mod ui;

use app::SurveyReportApp;
use config::Settings;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let settings = Settings::load();
    log::debug!("settings: {settings:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(settings.window_size)
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Survey Report",
        options,
        Box::new(|_cc| {
            let mut app = SurveyReportApp::new(settings);
            // Optional link such as `?name=Route&client=Acme&step=1`.
            if let Some(url) = std::env::args().nth(1) {
                app.state.apply_query(&url);
            }
            Ok(Box::new(app))
        }),
    )
}
