//! Incident table ingestion from CSV.

use crate::error::{AppError, Result};
use crate::models::{IncidentRecord, INCIDENT_STATUS, REQUIRED_COLUMNS};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Parsed input table: the header plus one record per data row
#[derive(Debug, Clone, Default)]
pub struct IncidentTable {
    pub columns: Arc<Vec<String>>,
    pub records: Vec<IncidentRecord>,
}

impl IncidentTable {
    /// Read a table from CSV data with a header row.
    ///
    /// Every required column must be present; the check runs before any row
    /// is read.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        for required in REQUIRED_COLUMNS {
            if !columns.iter().any(|c| c == required) {
                return Err(AppError::MissingColumn(required.to_string()));
            }
        }

        let columns = Arc::new(columns);
        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            if row.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            let cells = row.iter().map(str::to_string).collect();
            records.push(IncidentRecord::from_row(Arc::clone(&columns), cells));
        }

        debug!(
            columns = columns.len(),
            rows = records.len(),
            "Incident table parsed"
        );

        Ok(Self { columns, records })
    }

    /// Read a table from a CSV file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Fail unless the table carries an incident status column
    pub fn require_status_column(&self) -> Result<()> {
        if self.has_column(INCIDENT_STATUS) {
            Ok(())
        } else {
            Err(AppError::MissingColumn(INCIDENT_STATUS.to_string()))
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
