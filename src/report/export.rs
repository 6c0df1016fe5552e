use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};

use super::ProjectReport;

/// Output format, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => bail!("Unsupported export extension: .{other}"),
        }
    }
}

/// Write the results table to `path`.
pub fn export_report(report: &ProjectReport, path: &Path) -> Result<()> {
    let format = ExportFormat::from_path(path)?;
    let file = File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;

    match format {
        ExportFormat::Csv => write_csv(report, file),
        ExportFormat::Json => write_json(report, file),
    }
    .with_context(|| format!("writing {}", path.display()))?;

    log::info!("exported report to {}", path.display());
    Ok(())
}

/// Header row of column titles followed by one row of values.
pub fn write_csv<W: Write>(report: &ProjectReport, out: W) -> Result<()> {
    let table = report.table();
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(table.iter().map(|(title, _)| *title))?;
    writer.write_record(table.iter().map(|(_, value)| value.as_str()))?;
    writer.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(report: &ProjectReport, mut out: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, report)?;
    writeln!(out)?;
    Ok(())
}
