use serde::{Deserialize, Serialize};

use super::model::{CellValue, Row};

// ---------------------------------------------------------------------------
// Axis keys
// ---------------------------------------------------------------------------

/// Column titles holding the three coordinate axes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisKeys {
    pub x: String,
    pub y: String,
    pub z: String,
}

impl Default for AxisKeys {
    fn default() -> Self {
        Self {
            x: "X".to_string(),
            y: "Y".to_string(),
            z: "Z".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// RangeStatistics
// ---------------------------------------------------------------------------

/// Per-axis minimum and maximum over a dataset.
///
/// With no data every axis holds the sentinel `-1` / `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeStatistics {
    pub minimum_x: CellValue,
    pub maximum_x: CellValue,
    pub minimum_y: CellValue,
    pub maximum_y: CellValue,
    pub minimum_z: CellValue,
    pub maximum_z: CellValue,
}

pub const DEFAULT_MINIMUM: f64 = -1.0;
pub const DEFAULT_MAXIMUM: f64 = 0.0;

impl Default for RangeStatistics {
    fn default() -> Self {
        let (min, max) = sentinel();
        Self {
            minimum_x: min.clone(),
            maximum_x: max.clone(),
            minimum_y: min.clone(),
            maximum_y: max.clone(),
            minimum_z: min,
            maximum_z: max,
        }
    }
}

fn sentinel() -> (CellValue, CellValue) {
    (
        CellValue::Number(DEFAULT_MINIMUM),
        CellValue::Number(DEFAULT_MAXIMUM),
    )
}

// ---------------------------------------------------------------------------
// Reduction
// ---------------------------------------------------------------------------

/// Running extremes of one axis.
#[derive(Default)]
struct Extent<'a> {
    bounds: Option<(&'a CellValue, &'a CellValue)>,
}

impl<'a> Extent<'a> {
    fn observe(&mut self, value: &'a CellValue) {
        let (min, max) = self.bounds.get_or_insert((value, value));
        if value < *min {
            *min = value;
        }
        if value > *max {
            *max = value;
        }
    }

    fn finish(self) -> (CellValue, CellValue) {
        match self.bounds {
            Some((min, max)) => (min.clone(), max.clone()),
            None => sentinel(),
        }
    }
}

/// Scan `rows` once and collect the extremes of each axis.
///
/// A row missing an axis key is skipped for that axis only. An axis is
/// seeded from the first row that has it; an axis never seen keeps the
/// sentinel. Values of a different variant than the current extreme never
/// replace it.
pub fn reduce_range(rows: &[Row], keys: &AxisKeys) -> RangeStatistics {
    if rows.is_empty() {
        return RangeStatistics::default();
    }

    let mut x = Extent::default();
    let mut y = Extent::default();
    let mut z = Extent::default();

    for row in rows {
        if let Some(v) = row.get(&keys.x) {
            x.observe(v);
        }
        if let Some(v) = row.get(&keys.y) {
            y.observe(v);
        }
        if let Some(v) = row.get(&keys.z) {
            z.observe(v);
        }
    }

    let (minimum_x, maximum_x) = x.finish();
    let (minimum_y, maximum_y) = y.finish();
    let (minimum_z, maximum_z) = z.finish();

    RangeStatistics {
        minimum_x,
        maximum_x,
        minimum_y,
        maximum_y,
        minimum_z,
        maximum_z,
    }
}
