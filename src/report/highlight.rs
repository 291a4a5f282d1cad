use crate::models::EnrichedRecord;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Report cell a highlight applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum HighlightCell {
    #[strum(serialize = "Incident Status")]
    IncidentStatus,
    #[strum(serialize = "Incident Id")]
    IncidentId,
}

/// Highlight color intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HighlightColor {
    Green,
    Gray,
    Blue,
    Yellow,
    Pink,
    Red,
}

impl HighlightColor {
    /// Fill color used by spreadsheet renderers
    pub fn hex(&self) -> &'static str {
        match self {
            HighlightColor::Green => "#C6EFCE",
            HighlightColor::Gray => "#D9D9D9",
            HighlightColor::Blue => "#9DC3E6",
            HighlightColor::Yellow => "#FFF2CC",
            HighlightColor::Pink => "#E4A1C6",
            HighlightColor::Red => "#FF0000",
        }
    }
}

/// Conditional formatting for one report row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub cell: HighlightCell,
    pub color: HighlightColor,
}

impl Highlight {
    /// Highlight rule for a record, if any.
    ///
    /// Closed/completed rows mark the status cell green. Open/pending rows
    /// mark the incident id by age: 0 gray, 1 blue, 2 yellow, 3 pink,
    /// older red. Rows with unknown age get no highlight.
    pub fn for_record(record: &EnrichedRecord) -> Option<Self> {
        if record.is_closed() {
            return Some(Self {
                cell: HighlightCell::IncidentStatus,
                color: HighlightColor::Green,
            });
        }

        if !record.is_open() {
            return None;
        }

        let color = match record.days_elapsed? {
            0 => HighlightColor::Gray,
            1 => HighlightColor::Blue,
            2 => HighlightColor::Yellow,
            3 => HighlightColor::Pink,
            d if d > 3 => HighlightColor::Red,
            _ => return None,
        };

        Some(Self {
            cell: HighlightCell::IncidentId,
            color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IncidentRecord, PriorityTier, RiskTriple};

    fn record(status: &str, days: Option<i64>) -> EnrichedRecord {
        EnrichedRecord {
            record: IncidentRecord::new("INC-1", "obs", "").with_status(status),
            matched_component: "Unknown".to_string(),
            risk: RiskTriple::FALLBACK,
            risk_number: 10,
            priority: PriorityTier::Low,
            normalized_creation_date: None,
            days_elapsed: days,
            month: None,
        }
    }

    fn color(status: &str, days: Option<i64>) -> Option<HighlightColor> {
        Highlight::for_record(&record(status, days)).map(|h| h.color)
    }

    #[test]
    fn test_closed_marks_status_green() {
        for status in ["Closed", "completed", " COMPLETED "] {
            let highlight = Highlight::for_record(&record(status, Some(10))).unwrap();
            assert_eq!(highlight.cell, HighlightCell::IncidentStatus);
            assert_eq!(highlight.color, HighlightColor::Green);
        }
    }

    #[test]
    fn test_open_marks_incident_id_by_age() {
        assert_eq!(color("Open", Some(0)), Some(HighlightColor::Gray));
        assert_eq!(color("open", Some(1)), Some(HighlightColor::Blue));
        assert_eq!(color("Pending", Some(2)), Some(HighlightColor::Yellow));
        assert_eq!(color("pending", Some(3)), Some(HighlightColor::Pink));
        assert_eq!(color("OPEN", Some(4)), Some(HighlightColor::Red));
        assert_eq!(color("Open", Some(90)), Some(HighlightColor::Red));

        let highlight = Highlight::for_record(&record("Open", Some(1))).unwrap();
        assert_eq!(highlight.cell, HighlightCell::IncidentId);
    }

    #[test]
    fn test_no_highlight_cases() {
        assert_eq!(color("Open", None), None);
        assert_eq!(color("Open", Some(-1)), None);
        assert_eq!(color("In Progress", Some(5)), None);
        assert_eq!(color("", Some(5)), None);
    }

    #[test]
    fn test_hex_and_labels() {
        assert_eq!(HighlightColor::Red.hex(), "#FF0000");
        assert_eq!(HighlightColor::Green.to_string(), "green");
        assert_eq!(HighlightCell::IncidentId.to_string(), "Incident Id");
    }
}
