use crate::error::Result;
use crate::report::{Highlight, Report, ReportGroup};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Trailing column carrying the highlight rule in CSV output
pub const HIGHLIGHT_COLUMN: &str = "Highlight";

/// Write one group as CSV with a trailing highlight column
pub fn write_group_csv<W: Write>(group: &ReportGroup, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = group.columns.iter().map(String::as_str).collect();
    header.push(HIGHLIGHT_COLUMN);
    writer.write_record(&header)?;

    for row in &group.rows {
        let highlight = row.highlight.map(format_highlight).unwrap_or_default();
        writer.write_record(row.cells.iter().map(String::as_str).chain([highlight.as_str()]))?;
    }

    writer.flush()?;
    Ok(())
}

/// Write every group of a report to `<dir>/<group name>.csv`
pub fn write_report_csv(report: &Report, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(report.groups.len());
    for group in &report.groups {
        let path = dir.join(format!("{}.csv", group.name));
        let file = std::fs::File::create(&path)?;
        write_group_csv(group, file)?;

        info!(
            group = %group.name,
            rows = group.len(),
            path = %path.display(),
            "Report group written"
        );
        written.push(path);
    }

    Ok(written)
}

fn format_highlight(highlight: Highlight) -> String {
    format!("{}:{}", highlight.cell, highlight.color)
}
