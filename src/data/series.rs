use super::model::Row;

/// Chart points `(x_key, y_key)` per row, e.g. `(KP, X)`.
///
/// Rows where either value is missing or not a number are left out.
pub fn chart_points(rows: &[Row], x_key: &str, y_key: &str) -> Vec<[f64; 2]> {
    rows.iter()
        .filter_map(|row| {
            let x = row.get(x_key)?.as_f64()?;
            let y = row.get(y_key)?.as_f64()?;
            Some([x, y])
        })
        .collect()
}
