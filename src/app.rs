use eframe::egui;

use crate::config::Settings;
use crate::state::{AppState, WizardStep};
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SurveyReportApp {
    pub state: AppState,
}

impl SurveyReportApp {
    pub fn new(settings: Settings) -> Self {
        Self {
            state: AppState::new(settings),
        }
    }
}

impl eframe::App for SurveyReportApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Nothing wakes egui when the worker finishes, so check again later.
        if self.state.poll_loader() {
            ctx.request_repaint_after(self.state.settings.poll_interval());
        }

        // Files dropped onto the window; ignored outside the range step.
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            self.state
                .load_dropped(&file.name, file.path.as_deref(), file.bytes.as_deref());
        }

        // ---- Top panel: step indicator ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state);
        });

        // ---- Bottom panel: navigation ----
        egui::TopBottomPanel::bottom("navigation").show(ctx, |ui| {
            panels::navigation(ui, &mut self.state);
        });

        // ---- Central panel: current step ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.step {
            WizardStep::ProjectInformation => panels::project_form(ui, &mut self.state),
            WizardStep::Ranges => panels::range_form(ui, &mut self.state),
            WizardStep::Result => {
                panels::result_table(ui, &mut self.state);
                ui.add_space(12.0);
                plot::route_plot(ui, &self.state);
            }
        });
    }
}
