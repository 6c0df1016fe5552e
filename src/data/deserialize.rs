use super::model::{CellValue, Dataset, Row};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Deserialize comma separated text into rows.
///
/// The first non-blank line holds the column titles. Every line and every
/// field is trimmed and blank ones are dropped, so a row with an interior
/// empty field shifts its remaining fields one title to the left. Fields
/// beyond the last title get a positional key `[<line>][<field>]`, both
/// 1-based and counted over the surviving lines.
///
/// Quoting is not supported: commas and newlines always split.
pub fn deserialize(text: &str) -> Dataset {
    let lines = sanitize(text.split('\n'));
    let mut titles: Vec<&str> = Vec::new();
    let mut dataset = Vec::with_capacity(lines.len().saturating_sub(1));

    for (i, line) in lines.iter().enumerate() {
        let fields = sanitize(line.split(','));

        if i == 0 {
            titles = fields;
            continue;
        }

        let mut row = Row::new();
        for (j, field) in fields.into_iter().enumerate() {
            let value = coerce(field);
            match titles.get(j) {
                Some(title) => row.insert(*title, value),
                None => row.insert(format!("[{}][{}]", i + 1, j + 1), value),
            }
        }
        dataset.push(row);
    }

    log::debug!(
        "deserialized {} rows with {} column titles",
        dataset.len(),
        titles.len()
    );
    dataset
}

/// Trim every piece and drop the ones left empty.
pub fn sanitize<'a>(pieces: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    pieces.map(str::trim).filter(|s| !s.is_empty()).collect()
}

// ---------------------------------------------------------------------------
// Type coercion
// ---------------------------------------------------------------------------

/// Coerce a trimmed field: exact `true`/`false`, then numbers, else text.
pub fn coerce(field: &str) -> CellValue {
    match field {
        "true" => CellValue::Bool(true),
        "false" => CellValue::Bool(false),
        _ => match parse_number(field) {
            Some(v) => CellValue::Number(v),
            None => CellValue::Text(field.to_string()),
        },
    }
}

/// Decimal numbers only. Rust's parser also accepts `inf`, `infinity` and
/// `nan` in any case; those stay text. Overflowing exponents give ±∞.
fn parse_number(field: &str) -> Option<f64> {
    if field.is_empty() {
        return None;
    }
    let unsigned = field.trim_start_matches(['+', '-']);
    if unsigned.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    field.parse::<f64>().ok().filter(|v| !v.is_nan())
}
