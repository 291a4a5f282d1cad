use crate::models::PriorityTier;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Free-text observation column
pub const OBSERVATION: &str = "Observation";
/// Raw creation date column
pub const CREATION_DATE: &str = "Creation Date";
/// Incident identifier column
pub const INCIDENT_ID: &str = "Incident Id";
/// Incident status column (required only for alerting)
pub const INCIDENT_STATUS: &str = "Incident Status";

/// Columns every input table must carry before enrichment
pub const REQUIRED_COLUMNS: [&str; 3] = [OBSERVATION, CREATION_DATE, INCIDENT_ID];

/// Canonical rendering of normalized creation dates
pub const CANONICAL_DATE_FORMAT: &str = "%d/%m/%Y";

/// Severity, occurrence and detection factors of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RiskTriple {
    pub severity: i64,
    pub occurrence: i64,
    pub detection: i64,
}

impl RiskTriple {
    /// Triple used when no catalog component matches; its RPN of 10 classifies as Low
    pub const FALLBACK: RiskTriple = RiskTriple {
        severity: 1,
        occurrence: 1,
        detection: 10,
    };

    pub fn new(severity: i64, occurrence: i64, detection: i64) -> Self {
        Self {
            severity,
            occurrence,
            detection,
        }
    }

    /// Risk priority number: severity x occurrence x detection.
    ///
    /// Catalog entries are validated not to overflow; other triples
    /// saturate instead of wrapping.
    pub fn risk_number(&self) -> i64 {
        self.severity
            .saturating_mul(self.occurrence)
            .saturating_mul(self.detection)
    }
}

/// One input row of the complaint table
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentRecord {
    /// Observation text used for component matching
    pub observation: String,

    /// Creation date exactly as it appeared in the input
    pub creation_date_raw: String,

    /// Incident identifier
    pub incident_id: String,

    /// Incident status, absent when the table has no status column
    pub incident_status: Option<String>,

    /// Header of the table this row came from
    pub columns: Arc<Vec<String>>,

    /// All cells of the row, aligned with `columns`
    pub cells: Vec<String>,
}

impl IncidentRecord {
    /// Build a record from a row of a table whose header is `columns`.
    ///
    /// Missing trailing cells are padded with empty strings.
    pub fn from_row(columns: Arc<Vec<String>>, mut cells: Vec<String>) -> Self {
        cells.resize(columns.len(), String::new());

        let cell = |name: &str| {
            columns
                .iter()
                .position(|c| c == name)
                .map(|idx| cells[idx].clone())
        };

        let observation = cell(OBSERVATION).unwrap_or_default();
        let creation_date_raw = cell(CREATION_DATE).unwrap_or_default();
        let incident_id = cell(INCIDENT_ID).unwrap_or_default();
        let incident_status = cell(INCIDENT_STATUS);

        Self {
            observation,
            creation_date_raw,
            incident_id,
            incident_status,
            columns,
            cells,
        }
    }

    /// Build a minimal record carrying only the required columns
    pub fn new(
        incident_id: impl Into<String>,
        observation: impl Into<String>,
        creation_date_raw: impl Into<String>,
    ) -> Self {
        let columns = Arc::new(vec![
            INCIDENT_ID.to_string(),
            OBSERVATION.to_string(),
            CREATION_DATE.to_string(),
        ]);
        let cells = vec![
            incident_id.into(),
            observation.into(),
            creation_date_raw.into(),
        ];
        Self::from_row(columns, cells)
    }

    /// Set (or add) the incident status column
    pub fn with_status(self, status: impl Into<String>) -> Self {
        self.with_field(INCIDENT_STATUS, status)
    }

    /// Set (or add) an arbitrary column
    pub fn with_field(self, name: &str, value: impl Into<String>) -> Self {
        let mut columns = self.columns.as_ref().clone();
        let mut cells = self.cells;
        let value = value.into();

        match columns.iter().position(|c| c == name) {
            Some(idx) => cells[idx] = value,
            None => {
                columns.push(name.to_string());
                cells.push(value);
            }
        }

        Self::from_row(Arc::new(columns), cells)
    }

    /// Value of a column by name
    pub fn field(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|c| c == name)
            .and_then(|idx| self.cells.get(idx))
            .map(String::as_str)
    }

    /// Status trimmed and lower-cased
    pub fn normalized_status(&self) -> Option<String> {
        self.incident_status
            .as_deref()
            .map(|s| s.trim().to_lowercase())
    }
}

/// Incident record with matched component, risk and date enrichment.
///
/// Created once per retained input row; later stages only reorder or filter.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    pub record: IncidentRecord,
    pub matched_component: String,
    pub risk: RiskTriple,
    pub risk_number: i64,
    pub priority: PriorityTier,
    pub normalized_creation_date: Option<NaiveDate>,
    pub days_elapsed: Option<i64>,
    pub month: Option<String>,
}

impl EnrichedRecord {
    /// Creation date rendered as `DD/MM/YYYY`
    pub fn canonical_creation_date(&self) -> Option<String> {
        self.normalized_creation_date
            .map(|d| d.format(CANONICAL_DATE_FORMAT).to_string())
    }

    /// True when the status is `open` or `pending`
    pub fn is_open(&self) -> bool {
        matches!(
            self.record.normalized_status().as_deref(),
            Some("open") | Some("pending")
        )
    }

    /// True when the status is `closed` or `completed`
    pub fn is_closed(&self) -> bool {
        matches!(
            self.record.normalized_status().as_deref(),
            Some("closed") | Some("completed")
        )
    }
}
