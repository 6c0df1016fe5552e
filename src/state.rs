use std::path::Path;

use crate::config::Settings;
use crate::data::deserialize::coerce;
use crate::data::loader::{AsyncFileLoader, BytesSource, FileSource, LoadState, TextSource};
use crate::data::model::{CellValue, Dataset};
use crate::data::range::{RangeStatistics, reduce_range};
use crate::data::series::chart_points;
use crate::report::query::parse_step;
use crate::report::{ProjectInfo, ProjectReport, ValidationError, validate_ranges};

pub const DEFAULT_FILE_LABEL: &str = "Choose a CSV file";

// ---------------------------------------------------------------------------
// Wizard steps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WizardStep {
    #[default]
    ProjectInformation,
    Ranges,
    Result,
}

// ---------------------------------------------------------------------------
// Range inputs – editable text behind the six range fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeInputs {
    pub maximum_x: String,
    pub minimum_x: String,
    pub maximum_y: String,
    pub minimum_y: String,
    pub maximum_z: String,
    pub minimum_z: String,
}

impl Default for RangeInputs {
    fn default() -> Self {
        Self::from_stats(&RangeStatistics::default())
    }
}

impl RangeInputs {
    pub fn from_stats(stats: &RangeStatistics) -> Self {
        Self {
            maximum_x: stats.maximum_x.to_string(),
            minimum_x: stats.minimum_x.to_string(),
            maximum_y: stats.maximum_y.to_string(),
            minimum_y: stats.minimum_y.to_string(),
            maximum_z: stats.maximum_z.to_string(),
            minimum_z: stats.minimum_z.to_string(),
        }
    }

    /// Coerce the typed text the same way CSV cells are coerced.
    pub fn to_stats(&self) -> RangeStatistics {
        let cell = |s: &str| -> CellValue { coerce(s.trim()) };
        RangeStatistics {
            minimum_x: cell(&self.minimum_x),
            maximum_x: cell(&self.maximum_x),
            minimum_y: cell(&self.minimum_y),
            maximum_y: cell(&self.maximum_y),
            minimum_z: cell(&self.minimum_z),
            maximum_z: cell(&self.maximum_z),
        }
    }

    /// Label/value pairs for the form, maximum before minimum per axis.
    pub fn fields_mut(&mut self) -> [(&'static str, &mut String); 6] {
        [
            ("Maximum X", &mut self.maximum_x),
            ("Minimum X", &mut self.minimum_x),
            ("Maximum Y", &mut self.maximum_y),
            ("Minimum Y", &mut self.minimum_y),
            ("Maximum Z", &mut self.maximum_z),
            ("Minimum Z", &mut self.minimum_z),
        ]
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub settings: Settings,

    pub step: WizardStep,

    /// Project metadata typed on the first step.
    pub info: ProjectInfo,

    /// Range fields on the second step.
    pub ranges: RangeInputs,

    /// Rows of the last successfully loaded CSV (empty when none).
    pub dataset: Dataset,

    /// Outstanding or finished load of the picked file.
    pub loader: Option<AsyncFileLoader>,

    /// Last observed state of `loader`.
    pub load_state: LoadState,

    /// Text on the file picker button.
    pub file_label: String,

    /// Report shown on the result step.
    pub report: Option<ProjectReport>,

    /// Validation failure blocking the current step.
    pub validation: Option<ValidationError>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            step: WizardStep::default(),
            info: ProjectInfo::default(),
            ranges: RangeInputs::default(),
            dataset: Vec::new(),
            loader: None,
            load_state: LoadState::NotStarted,
            file_label: DEFAULT_FILE_LABEL.to_string(),
            report: None,
            validation: None,
            status_message: None,
        }
    }

    /// Prefill the wizard from a `?name=…&step=1` link. Incomplete project
    /// information always lands on the first step.
    pub fn apply_query(&mut self, url: &str) {
        let report = ProjectReport::from_query_string(url);
        self.info = report.info;
        self.ranges = RangeInputs::from_stats(&report.range);
        self.step = if parse_step(url) >= 1 && self.info.validate().is_ok() {
            WizardStep::Ranges
        } else {
            WizardStep::ProjectInformation
        };
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_some() && !self.load_state.is_terminal()
    }

    /// Begin loading a picked file. Any earlier load is aborted and dropped.
    pub fn start_loading(&mut self, path: &Path) {
        self.start_loading_source(FileSource::new(path));
    }

    pub fn start_loading_source<S: TextSource>(&mut self, source: S) {
        if let Some(previous) = self.loader.take() {
            previous.abort();
        }
        self.status_message = None;
        self.loader = Some(AsyncFileLoader::start(source));
        self.load_state = LoadState::NotStarted;
    }

    /// A file dropped onto the window. Native drops carry a path, web drops
    /// only the bytes. Ignored outside the range step.
    pub fn load_dropped(&mut self, name: &str, path: Option<&Path>, bytes: Option<&[u8]>) {
        if self.step != WizardStep::Ranges {
            log::debug!("ignoring dropped file {name} on step {:?}", self.step);
            return;
        }
        match (path, bytes) {
            (Some(path), _) => self.start_loading(path),
            (None, Some(bytes)) => self.start_loading_source(BytesSource::new(name, bytes)),
            (None, None) => log::warn!("dropped file {name} has neither path nor contents"),
        }
    }

    /// Check the outstanding load once. Returns `true` while still loading.
    pub fn poll_loader(&mut self) -> bool {
        let Some(loader) = self.loader.as_mut() else {
            return false;
        };
        let state = loader.poll();
        if state == self.load_state {
            return !state.is_terminal();
        }
        self.load_state = state;

        match state {
            LoadState::NotStarted | LoadState::Loading => return true,
            LoadState::Loaded => {
                self.file_label = loader.name().to_string();
                self.dataset = loader.dataset().clone();
            }
            LoadState::Aborted => {
                self.dataset.clear();
                self.status_message = Some(format!("Loading {} was cancelled", loader.name()));
            }
            LoadState::Error => {
                self.dataset.clear();
                let cause = loader
                    .error()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "unknown error".to_string());
                self.status_message = Some(format!("Error: {cause}"));
            }
        }

        let stats = reduce_range(&self.dataset, &self.settings.axes);
        self.ranges = RangeInputs::from_stats(&stats);
        false
    }

    /// Cancel the outstanding load, if any.
    pub fn cancel_loading(&mut self) {
        if let Some(loader) = &self.loader {
            loader.abort();
        }
    }

    /// The file picker was dismissed without a selection.
    pub fn clear_file(&mut self) {
        self.cancel_loading();
        self.loader = None;
        self.load_state = LoadState::NotStarted;
        self.dataset.clear();
        self.ranges = RangeInputs::default();
        self.file_label = DEFAULT_FILE_LABEL.to_string();
    }

    /// Advance the wizard if the current step validates.
    pub fn next_step(&mut self) {
        let result = match self.step {
            WizardStep::ProjectInformation => self.info.validate().map(|()| WizardStep::Ranges),
            WizardStep::Ranges => self.build_report().map(|report| {
                log::info!("report ready for {}", report.info.name);
                self.report = Some(report);
                WizardStep::Result
            }),
            WizardStep::Result => Ok(WizardStep::Result),
        };

        match result {
            Ok(step) => {
                self.validation = None;
                self.step = step;
            }
            Err(e) => {
                log::debug!("validation failed: {e}");
                self.validation = Some(e);
            }
        }
    }

    pub fn previous_step(&mut self) {
        self.validation = None;
        self.step = match self.step {
            WizardStep::ProjectInformation | WizardStep::Ranges => WizardStep::ProjectInformation,
            WizardStep::Result => WizardStep::Ranges,
        };
    }

    fn build_report(&self) -> Result<ProjectReport, ValidationError> {
        let range = self.ranges.to_stats();
        validate_ranges(&range)?;
        Ok(ProjectReport {
            info: self.info.clone(),
            range,
        })
    }

    /// Points for the result chart; empty when no CSV was loaded.
    pub fn chart_points(&self) -> Vec<[f64; 2]> {
        let keys = &self.settings.chart;
        chart_points(&self.dataset, &keys.x, &keys.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn filled_info() -> ProjectInfo {
        ProjectInfo {
            name: "Route".into(),
            description: "Survey".into(),
            client: "Client".into(),
            contractor: "Contractor".into(),
        }
    }

    fn settle(state: &mut AppState) {
        while state.poll_loader() {
            thread::yield_now();
        }
    }

    fn load(state: &mut AppState, source: BytesSource) {
        state.start_loading_source(source);
        settle(state);
    }

    #[test]
    fn loading_csv_fills_range_inputs() {
        let mut state = AppState::default();
        load(
            &mut state,
            BytesSource::new("route.csv", "KP,X,Y,Z\n0,10,5,-2\n1,14,3,-1\n"),
        );

        assert_eq!(state.load_state, LoadState::Loaded);
        assert_eq!(state.file_label, "route.csv");
        assert_eq!(state.dataset.len(), 2);
        assert_eq!(state.ranges.minimum_x, "10");
        assert_eq!(state.ranges.maximum_x, "14");
        assert_eq!(state.ranges.minimum_z, "-2");
        assert_eq!(state.chart_points(), vec![[0.0, 10.0], [1.0, 14.0]]);
    }

    #[test]
    fn header_only_file_resets_ranges_to_sentinel() {
        let mut state = AppState::default();
        state.ranges.maximum_x = "99".into();
        load(&mut state, BytesSource::new("empty.csv", "KP,X,Y,Z\n"));

        assert_eq!(state.load_state, LoadState::Loaded);
        assert_eq!(state.ranges, RangeInputs::default());
        assert!(state.chart_points().is_empty());
    }

    #[test]
    fn infinite_extremes_survive_the_range_form() {
        let mut state = AppState::default();
        state.info = filled_info();
        state.next_step();
        load(&mut state, BytesSource::new("far.csv", "X,Y,Z\n1,2,3\n1e999,-1e999,4\n"));

        assert_eq!(state.ranges.maximum_x, "1e999");
        assert_eq!(state.ranges.minimum_y, "-1e999");
        assert_eq!(state.ranges.to_stats().maximum_x, CellValue::Number(f64::INFINITY));

        state.next_step();
        assert_eq!(state.step, WizardStep::Result);
        let report = state.report.as_ref().unwrap();
        assert_eq!(report.range.minimum_y, CellValue::Number(f64::NEG_INFINITY));
    }

    #[test]
    fn missing_file_reports_error_and_resets_ranges() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::default();
        load(&mut state, BytesSource::new("a.csv", "X,Y,Z\n1,2,3\n"));
        assert_eq!(state.ranges.maximum_z, "3");

        state.start_loading(&dir.path().join("missing.csv"));
        settle(&mut state);

        assert_eq!(state.load_state, LoadState::Error);
        assert!(state.dataset.is_empty());
        assert_eq!(state.ranges, RangeInputs::default());
        let message = state.status_message.as_deref().unwrap_or_default();
        assert!(message.starts_with("Error: failed to read"), "{message}");
        assert!(message.contains("missing.csv"), "{message}");
    }

    /// Reads nothing until the test sends on `release`.
    struct HeldSource {
        release: std::sync::mpsc::Receiver<()>,
    }

    impl TextSource for HeldSource {
        fn name(&self) -> String {
            "held.csv".into()
        }

        fn read_text(
            &mut self,
            abort: &crate::data::loader::AbortSignal,
        ) -> Result<Option<String>, crate::data::loader::LoadError> {
            let _ = self.release.recv();
            if abort.is_raised() {
                return Ok(None);
            }
            Ok(Some("X,Y,Z\n1,2,3\n".into()))
        }
    }

    #[test]
    fn cancelled_load_reports_status_and_resets_ranges() {
        let mut state = AppState::default();
        load(&mut state, BytesSource::new("a.csv", "X,Y,Z\n4,5,6\n"));

        let (release, held) = std::sync::mpsc::channel();
        state.start_loading_source(HeldSource { release: held });
        assert!(state.is_loading());
        state.cancel_loading();
        release.send(()).unwrap();
        settle(&mut state);

        assert_eq!(state.load_state, LoadState::Aborted);
        assert!(state.dataset.is_empty());
        assert_eq!(state.ranges, RangeInputs::default());
        assert_eq!(
            state.status_message.as_deref(),
            Some("Loading held.csv was cancelled")
        );
    }

    #[test]
    fn dropped_bytes_load_only_on_range_step() {
        let mut state = AppState::default();
        state.load_dropped("drop.csv", None, Some(&b"X,Y,Z\n5,6,7\n"[..]));
        assert!(state.loader.is_none());

        state.info = filled_info();
        state.next_step();
        state.load_dropped("drop.csv", None, Some(&b"X,Y,Z\n5,6,7\n"[..]));
        settle(&mut state);

        assert_eq!(state.load_state, LoadState::Loaded);
        assert_eq!(state.file_label, "drop.csv");
        assert_eq!(state.ranges.maximum_y, "6");
    }

    #[test]
    fn dropped_path_is_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("route.csv");
        std::fs::write(&path, "X,Y,Z\n-3,0,9\n").unwrap();

        let mut state = AppState::default();
        state.step = WizardStep::Ranges;
        state.load_dropped("", Some(&path), None);
        settle(&mut state);

        assert_eq!(state.load_state, LoadState::Loaded);
        assert_eq!(state.file_label, "route.csv");
        assert_eq!(state.ranges.minimum_x, "-3");
    }

    #[test]
    fn range_fields_edit_the_matching_inputs() {
        let mut inputs = RangeInputs::default();
        let labels: Vec<&str> = inputs.fields_mut().into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels[0], "Maximum X");
        assert_eq!(labels[5], "Minimum Z");

        for (label, value) in inputs.fields_mut() {
            if label == "Minimum Y" {
                *value = "-4".into();
            }
        }
        assert_eq!(inputs.minimum_y, "-4");
        assert_eq!(inputs.maximum_y, "0");
    }

    #[test]
    fn clearing_file_restores_defaults() {
        let mut state = AppState::default();
        load(&mut state, BytesSource::new("a.csv", "X,Y,Z\n1,2,3\n4,5,6"));
        state.clear_file();

        assert!(state.dataset.is_empty());
        assert_eq!(state.file_label, DEFAULT_FILE_LABEL);
        assert_eq!(state.ranges, RangeInputs::default());
    }

    #[test]
    fn query_prefills_wizard() {
        let mut state = AppState::default();
        state.apply_query("/?name=Route&description=Survey&client=Client&contractor=Contractor&minimumX=2&step=1");
        assert_eq!(state.step, WizardStep::Ranges);
        assert_eq!(state.info, filled_info());
        assert_eq!(state.ranges.minimum_x, "2");
        assert_eq!(state.ranges.maximum_x, "0");

        let mut state = AppState::default();
        state.apply_query("/?name=Route&step=1");
        assert_eq!(state.step, WizardStep::ProjectInformation);
        assert_eq!(state.info.name, "Route");
    }

    #[test]
    fn wizard_requires_project_information() {
        let mut state = AppState::default();
        state.next_step();
        assert_eq!(state.step, WizardStep::ProjectInformation);
        assert_eq!(state.validation.as_ref().map(|e| e.field), Some("name"));

        state.info = filled_info();
        state.next_step();
        assert_eq!(state.step, WizardStep::Ranges);
        assert!(state.validation.is_none());
    }

    #[test]
    fn wizard_builds_report_from_ranges() {
        let mut state = AppState::default();
        state.info = filled_info();
        state.next_step();

        state.ranges.minimum_y = "3".into();
        state.ranges.maximum_y = "1".into();
        state.next_step();
        assert_eq!(state.step, WizardStep::Ranges);
        assert_eq!(state.validation.as_ref().map(|e| e.field), Some("minimumY"));

        state.ranges.maximum_y = "7.5".into();
        state.next_step();
        assert_eq!(state.step, WizardStep::Result);
        let report = state.report.as_ref().unwrap();
        assert_eq!(report.range.maximum_y, CellValue::Number(7.5));
        assert_eq!(report.info, filled_info());

        state.previous_step();
        assert_eq!(state.step, WizardStep::Ranges);
    }
}
