use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::range::AxisKeys;

/// Settings file looked up in the working directory.
pub const SETTINGS_FILE: &str = "survey-report.toml";

/// Runtime settings.
///
/// ```toml
/// poll_interval_ms = 250
///
/// [axes]
/// x = "X"
/// y = "Y"
/// z = "Z"
///
/// [chart]
/// x = "KP"
/// y = "X"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// How often the UI checks an outstanding load.
    pub poll_interval_ms: u64,
    pub axes: AxisKeys,
    pub chart: ChartKeys,
    pub window_size: [f32; 2],
}

/// Columns plotted on the result view.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChartKeys {
    pub x: String,
    pub y: String,
}

impl Default for ChartKeys {
    fn default() -> Self {
        Self {
            x: "KP".to_string(),
            y: "X".to_string(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 250,
            axes: AxisKeys::default(),
            chart: ChartKeys::default(),
            window_size: [1100.0, 760.0],
        }
    }
}

impl Settings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Parse settings from TOML text. Missing keys keep their defaults.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("parsing settings")
    }

    /// Read the settings file if it exists.
    pub fn from_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml(&text).map(Some)
    }

    /// Apply `SURVEY_REPORT_*` overrides from `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(ms) = lookup("SURVEY_REPORT_POLL_MS") {
            match ms.trim().parse() {
                Ok(ms) => self.poll_interval_ms = ms,
                Err(_) => log::warn!("ignoring SURVEY_REPORT_POLL_MS={ms:?}: not a number"),
            }
        }
        let axes = [
            ("SURVEY_REPORT_AXIS_X", &mut self.axes.x),
            ("SURVEY_REPORT_AXIS_Y", &mut self.axes.y),
            ("SURVEY_REPORT_AXIS_Z", &mut self.axes.z),
        ];
        for (var, slot) in axes {
            if let Some(key) = lookup(var).filter(|k| !k.trim().is_empty()) {
                *slot = key.trim().to_string();
            }
        }
    }

    /// Defaults, then the settings file, then the environment.
    /// A broken settings file is logged and skipped.
    pub fn load() -> Self {
        let mut settings = match Self::from_file(Path::new(SETTINGS_FILE)) {
            Ok(Some(s)) => {
                log::info!("loaded settings from {SETTINGS_FILE}");
                s
            }
            Ok(None) => Self::default(),
            Err(e) => {
                log::error!("{e:#}; using default settings");
                Self::default()
            }
        };
        settings.apply_env(|var| std::env::var(var).ok());
        settings
    }
}
