/// Report assembly
///
/// This module partitions enriched records into the SPN / Non-SPN groups,
/// orders them by priority, attaches the highlight rule of every row and
/// renders the result as tables.

pub mod highlight;
pub mod segregation;
pub mod writer;

pub use highlight::{Highlight, HighlightCell, HighlightColor};
pub use segregation::{is_spn, segregate, sort_by_priority, SPN_MARKER};
pub use writer::{write_group_csv, write_report_csv};

use crate::enrichment::DateRange;
use crate::models::{EnrichedRecord, CREATION_DATE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the group holding observations that mention SPN
pub const SPN_GROUP: &str = "SPN";
/// Name of the group holding every other observation
pub const NON_SPN_GROUP: &str = "Non-SPN";

pub const DAYS_ELAPSED_COLUMN: &str = "Days Elapsed";
pub const MONTH_COLUMN: &str = "Month";
pub const COMPONENT_COLUMN: &str = "Component";
pub const RPN_COLUMN: &str = "RPN";
pub const PRIORITY_COLUMN: &str = "Priority";

/// Columns appended to the input columns, in order
pub const DERIVED_COLUMNS: [&str; 8] = [
    DAYS_ELAPSED_COLUMN,
    MONTH_COLUMN,
    COMPONENT_COLUMN,
    crate::catalog::SEVERITY_COLUMN,
    crate::catalog::OCCURRENCE_COLUMN,
    crate::catalog::DETECTION_COLUMN,
    RPN_COLUMN,
    PRIORITY_COLUMN,
];

/// One rendered report row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub cells: Vec<String>,
    pub highlight: Option<Highlight>,
}

/// A named, ordered table of report rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportGroup {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<ReportRow>,
}

impl ReportGroup {
    /// Render records under the given output columns
    pub fn render(name: &str, columns: &[String], records: &[EnrichedRecord]) -> Self {
        let rows = records
            .iter()
            .map(|record| ReportRow {
                cells: columns.iter().map(|c| cell_value(record, c)).collect(),
                highlight: Highlight::for_record(record),
            })
            .collect();

        Self {
            name: name.to_string(),
            columns: columns.to_vec(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Complete output of one triage run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub date_range: Option<DateRange>,
    pub groups: Vec<ReportGroup>,
    pub alert_count: usize,
}

impl Report {
    /// Group by name
    pub fn group(&self, name: &str) -> Option<&ReportGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn total_rows(&self) -> usize {
        self.groups.iter().map(ReportGroup::len).sum()
    }
}

/// Output columns: input columns (minus any that collide with derived
/// names) followed by the derived columns
pub fn report_columns(input_columns: &[String]) -> Vec<String> {
    input_columns
        .iter()
        .filter(|c| !DERIVED_COLUMNS.contains(&c.as_str()))
        .cloned()
        .chain(DERIVED_COLUMNS.iter().map(|c| c.to_string()))
        .collect()
}

/// Rendered value of a column for a record; missing values are empty
pub fn cell_value(record: &EnrichedRecord, column: &str) -> String {
    match column {
        DAYS_ELAPSED_COLUMN => record
            .days_elapsed
            .map(|d| d.to_string())
            .unwrap_or_default(),
        MONTH_COLUMN => record.month.clone().unwrap_or_default(),
        COMPONENT_COLUMN => record.matched_component.clone(),
        crate::catalog::SEVERITY_COLUMN => record.risk.severity.to_string(),
        crate::catalog::OCCURRENCE_COLUMN => record.risk.occurrence.to_string(),
        crate::catalog::DETECTION_COLUMN => record.risk.detection.to_string(),
        RPN_COLUMN => record.risk_number.to_string(),
        PRIORITY_COLUMN => record.priority.to_string(),
        CREATION_DATE => record.canonical_creation_date().unwrap_or_default(),
        other => record.record.field(other).unwrap_or_default().to_string(),
    }
}
