use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::report::ProjectReport;
use crate::report::export::export_report;
use crate::state::{AppState, WizardStep};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the step indicator and status line.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui: &mut Ui| {
        let steps = [
            (WizardStep::ProjectInformation, "1. Project"),
            (WizardStep::Ranges, "2. Ranges"),
            (WizardStep::Result, "3. Result"),
        ];
        for (step, label) in steps {
            let text = RichText::new(label);
            let text = if step == state.step { text.strong() } else { text.weak() };
            ui.label(text);
        }

        ui.separator();

        if state.is_loading() {
            ui.spinner();
            ui.label("Reading CSV…");
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Step 1 – project information
// ---------------------------------------------------------------------------

pub fn project_form(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Project information");
    ui.separator();

    let info = &mut state.info;
    let fields = [
        ("Project name", "Type a project name", &mut info.name),
        ("Project description", "A simple description for your project", &mut info.description),
        ("Client", "Enter your client", &mut info.client),
        ("Contractor", "Enter your contractor", &mut info.contractor),
    ];

    egui::Grid::new("project_form")
        .num_columns(2)
        .spacing([12.0, 8.0])
        .show(ui, |ui: &mut Ui| {
            for (label, hint, value) in fields {
                ui.label(label);
                ui.add(
                    egui::TextEdit::singleline(value)
                        .hint_text(hint)
                        .desired_width(320.0),
                );
                ui.end_row();
            }
        });

    validation_message(ui, state);
}

// ---------------------------------------------------------------------------
// Step 2 – ranges and optional CSV
// ---------------------------------------------------------------------------

pub fn range_form(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Coordinate ranges");
    ui.separator();

    let loading = state.is_loading();
    egui::Grid::new("range_form")
        .num_columns(4)
        .spacing([12.0, 8.0])
        .show(ui, |ui: &mut Ui| {
            for (i, (label, value)) in state.ranges.fields_mut().into_iter().enumerate() {
                ui.label(label);
                ui.add_enabled(
                    !loading,
                    egui::TextEdit::singleline(value).desired_width(120.0),
                );
                if i % 2 == 1 {
                    ui.end_row();
                }
            }
        });

    ui.add_space(8.0);
    ui.label("File selection (Optional)");
    ui.horizontal(|ui: &mut Ui| {
        if ui
            .add_enabled(!loading, egui::Button::new(state.file_label.as_str()))
            .clicked()
        {
            open_file_dialog(state);
        }
        if loading && ui.button("Cancel").clicked() {
            state.cancel_loading();
        }
        if let Some(first) = state.dataset.first() {
            let columns: Vec<&str> = first.keys().collect();
            ui.label(format!("{} rows", state.dataset.len()))
                .on_hover_text(columns.join(", "));
        }
    });
    ui.label(RichText::new("or drop a .csv file onto the window").weak());

    validation_message(ui, state);
}

fn validation_message(ui: &mut Ui, state: &AppState) {
    if let Some(err) = &state.validation {
        ui.add_space(6.0);
        ui.label(RichText::new(err.to_string()).color(Color32::RED));
    }
}

// ---------------------------------------------------------------------------
// Step 3 – result table
// ---------------------------------------------------------------------------

pub fn result_table(ui: &mut Ui, state: &mut AppState) {
    let Some(report) = state.report.clone() else {
        ui.label("No report yet.");
        return;
    };

    ui.horizontal(|ui: &mut Ui| {
        ui.heading("Result");
        if ui.button("Export…").clicked() {
            save_report_dialog(state, &report);
        }
        if ui.button("Copy link").clicked() {
            ui.ctx().copy_text(report.to_query_string());
        }
    });
    ui.separator();

    let table = report.table();
    TableBuilder::new(ui)
        .striped(true)
        .columns(Column::auto().resizable(true), table.len())
        .header(22.0, |mut header| {
            for (title, _) in &table {
                header.col(|ui: &mut Ui| {
                    ui.strong(*title);
                });
            }
        })
        .body(|mut body| {
            body.row(20.0, |mut row| {
                for (_, value) in &table {
                    row.col(|ui: &mut Ui| {
                        ui.label(value.as_str());
                    });
                }
            });
        });
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

pub fn navigation(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        if state.step != WizardStep::ProjectInformation && ui.button("◀ Back").clicked() {
            state.previous_step();
        }
        if state.step != WizardStep::Result
            && ui
                .add_enabled(!state.is_loading(), egui::Button::new("Next ▶"))
                .clicked()
        {
            state.next_step();
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Choose a CSV file")
        .add_filter("CSV", &["csv"])
        .pick_file();

    match file {
        Some(path) => {
            log::info!("selected {}", path.display());
            state.start_loading(&path);
        }
        None => state.clear_file(),
    }
}

fn save_report_dialog(state: &mut AppState, report: &ProjectReport) {
    let file = rfd::FileDialog::new()
        .set_title("Export result")
        .set_file_name(format!("{}.csv", report.file_stem()))
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .save_file();

    let Some(path) = file else {
        return;
    };
    match export_report(report, &path) {
        Ok(()) => state.status_message = None,
        Err(e) => {
            log::error!("Failed to export report: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
