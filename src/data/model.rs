use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CellValue – a single typed CSV field
// ---------------------------------------------------------------------------

/// A coerced CSV field: boolean, number or plain text.
///
/// Values of the same variant are ordered naturally. Values of different
/// variants are unordered, so neither `<` nor `>` holds between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        use CellValue::*;
        match (self, other) {
            (Bool(a), Bool(b)) => Some(a.cmp(b)),
            (Number(a), Number(b)) => a.partial_cmp(b),
            (Text(a), Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Bool(b) => write!(f, "{b}"),
            // `inf` would read back as text; 1e999 coerces to the same value.
            CellValue::Number(v) if v.is_infinite() => {
                f.write_str(if *v > 0.0 { "1e999" } else { "-1e999" })
            }
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl CellValue {
    /// Numeric view used by the chart and by range validation.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Row – one CSV record
// ---------------------------------------------------------------------------

/// One parsed record: column title → value, in source column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    cells: Vec<(String, CellValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value. A key that already exists keeps its position and
    /// takes the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: CellValue) {
        let key = key.into();
        match self.cells.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.cells.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(k, _)| k.as_str())
    }

}

/// Rows in input line order, header excluded.
pub type Dataset = Vec<Row>;
