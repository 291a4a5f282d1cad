//! Component catalog: the known components and their risk factors.
//!
//! The catalog is loaded once at startup and shared read-only (`Arc`) by
//! every processing run. It serves exact-name risk lookup and ordered
//! iteration for fuzzy matching.

use crate::error::{AppError, Result};
use crate::models::RiskTriple;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Catalog column holding the component name
pub const COMPONENT_COLUMN: &str = "Component";
/// Catalog column holding the severity factor
pub const SEVERITY_COLUMN: &str = "Severity (S)";
/// Catalog column holding the occurrence factor
pub const OCCURRENCE_COLUMN: &str = "Occurrence (O)";
/// Catalog column holding the detection factor
pub const DETECTION_COLUMN: &str = "Detection (D)";

/// A known component and its risk factors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub component_name: String,
    pub severity: i64,
    pub occurrence: i64,
    pub detection: i64,
}

impl CatalogEntry {
    pub fn new(component_name: impl Into<String>, severity: i64, occurrence: i64, detection: i64) -> Self {
        Self {
            component_name: component_name.into(),
            severity,
            occurrence,
            detection,
        }
    }

    /// Risk factors of this entry
    pub fn risk(&self) -> RiskTriple {
        RiskTriple::new(self.severity, self.occurrence, self.detection)
    }
}

/// Ordered, immutable collection of catalog entries
#[derive(Debug, Clone, Default)]
pub struct ComponentCatalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
}

impl ComponentCatalog {
    /// Build a catalog from entries.
    ///
    /// Blank names are skipped and duplicate names keep their first
    /// occurrence. Every factor must be a positive integer and their
    /// product must fit in an `i64`.
    pub fn new(entries: impl IntoIterator<Item = CatalogEntry>) -> Result<Self> {
        let mut catalog = Self::default();

        for entry in entries {
            let name = entry.component_name.trim();
            if name.is_empty() {
                continue;
            }

            if entry.severity <= 0 || entry.occurrence <= 0 || entry.detection <= 0 {
                return Err(AppError::Configuration(format!(
                    "Component '{}' has non-positive risk factors ({}, {}, {})",
                    name, entry.severity, entry.occurrence, entry.detection
                )));
            }

            if entry
                .severity
                .checked_mul(entry.occurrence)
                .and_then(|p| p.checked_mul(entry.detection))
                .is_none()
            {
                return Err(AppError::Configuration(format!(
                    "Component '{}' risk factors ({}, {}, {}) overflow the risk number",
                    name, entry.severity, entry.occurrence, entry.detection
                )));
            }

            if catalog.index.contains_key(name) {
                warn!(component = name, "Duplicate catalog component ignored");
                continue;
            }

            catalog
                .index
                .insert(name.to_string(), catalog.entries.len());
            catalog.entries.push(CatalogEntry {
                component_name: name.to_string(),
                ..entry
            });
        }

        Ok(catalog)
    }

    /// Load the catalog from a CSV file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            AppError::Configuration(format!(
                "Catalog file not found at {}: {}",
                path.display(),
                e
            ))
        })?;

        let catalog = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            components = catalog.len(),
            "Component catalog loaded"
        );
        Ok(catalog)
    }

    /// Load the catalog from CSV data with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let column = |name: &str| {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                AppError::Configuration(format!("Catalog column '{}' missing", name))
            })
        };

        let name_idx = column(COMPONENT_COLUMN)?;
        let severity_idx = column(SEVERITY_COLUMN)?;
        let occurrence_idx = column(OCCURRENCE_COLUMN)?;
        let detection_idx = column(DETECTION_COLUMN)?;

        let mut entries = Vec::new();
        for (line_num, row) in reader.records().enumerate() {
            let row = row?;
            let line = line_num + 2; // 1-indexed + header row

            let name = row.get(name_idx).unwrap_or("").to_string();
            if name.is_empty() {
                continue;
            }

            let factor = |idx: usize, label: &str| {
                parse_factor(row.get(idx).unwrap_or("")).ok_or_else(|| {
                    AppError::Configuration(format!(
                        "Invalid {} for component '{}' on line {}",
                        label, name, line
                    ))
                })
            };

            entries.push(CatalogEntry::new(
                name.clone(),
                factor(severity_idx, SEVERITY_COLUMN)?,
                factor(occurrence_idx, OCCURRENCE_COLUMN)?,
                factor(detection_idx, DETECTION_COLUMN)?,
            ));
        }

        Self::new(entries)
    }

    /// Entries in catalog order
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Exact-name lookup
    pub fn get(&self, component_name: &str) -> Option<&CatalogEntry> {
        self.index.get(component_name).map(|&idx| &self.entries[idx])
    }

    /// Risk factors of a component, falling back to [`RiskTriple::FALLBACK`]
    /// for names the catalog does not hold (including the unknown sentinel)
    pub fn risk_of(&self, component_name: &str) -> RiskTriple {
        self.get(component_name)
            .map(CatalogEntry::risk)
            .unwrap_or(RiskTriple::FALLBACK)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse a factor cell; integral decimals such as `8.0` are accepted
fn parse_factor(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.fract() == 0.0)
            .filter(|v| v.abs() <= MAX_EXACT_FACTOR)
            .map(|v| v as i64)
    })
}

/// Largest decimal factor that converts to an integer exactly (2^53)
const MAX_EXACT_FACTOR: f64 = 9_007_199_254_740_992.0;
