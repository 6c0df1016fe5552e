//! Project report: the metadata typed into the wizard plus the coordinate
//! ranges, with validation, query-string transport and export.

pub mod export;
pub mod query;

use serde::{Deserialize, Serialize};

use crate::data::model::CellValue;
use crate::data::range::RangeStatistics;

/// Rejected wizard input. `field` names the offending form field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: &'static str,
}

impl ValidationError {
    fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

// ---------------------------------------------------------------------------
// Project information
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    pub description: String,
    pub client: String,
    pub contractor: String,
}

impl ProjectInfo {
    /// Every field is required.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("name", &self.name),
            ("description", &self.description),
            ("client", &self.client),
            ("contractor", &self.contractor),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(ValidationError::new(field, "This field is required."));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Range validation
// ---------------------------------------------------------------------------

const RANGE_MESSAGE: &str = "Minimum value must be less than the maximum value.";

/// Each axis needs numeric bounds with `minimum < maximum`.
pub fn validate_ranges(range: &RangeStatistics) -> Result<(), ValidationError> {
    let axes = [
        ("minimumX", &range.minimum_x, &range.maximum_x),
        ("minimumY", &range.minimum_y, &range.maximum_y),
        ("minimumZ", &range.minimum_z, &range.maximum_z),
    ];
    for (field, min, max) in axes {
        match (min.as_f64(), max.as_f64()) {
            (Some(min), Some(max)) if max > min => {}
            _ => return Err(ValidationError::new(field, RANGE_MESSAGE)),
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// ProjectReport
// ---------------------------------------------------------------------------

/// Everything shown on the result view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectReport {
    #[serde(flatten)]
    pub info: ProjectInfo,
    #[serde(flatten)]
    pub range: RangeStatistics,
}

impl ProjectReport {
    /// Column titles and values of the results table, in display order.
    pub fn table(&self) -> Vec<(&'static str, String)> {
        let r = &self.range;
        let cell = |v: &CellValue| v.to_string();
        vec![
            ("Project Name", self.info.name.clone()),
            ("Description", self.info.description.clone()),
            ("Client", self.info.client.clone()),
            ("Contractor", self.info.contractor.clone()),
            ("Maximum X", cell(&r.maximum_x)),
            ("Minimum X", cell(&r.minimum_x)),
            ("Maximum Y", cell(&r.maximum_y)),
            ("Minimum Y", cell(&r.minimum_y)),
            ("Maximum Z", cell(&r.maximum_z)),
            ("Minimum Z", cell(&r.minimum_z)),
        ]
    }

    /// Base name for exported files.
    pub fn file_stem(&self) -> String {
        format!("{}_result", self.info.name.trim())
    }
}
