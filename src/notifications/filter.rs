use crate::models::EnrichedRecord;

/// Minimum age in days for an open incident to be escalated
pub const ALERT_MIN_DAYS_ELAPSED: i64 = 3;

/// Open or pending incidents at least [`ALERT_MIN_DAYS_ELAPSED`] days old.
///
/// Records with an unknown age are never eligible.
pub fn is_alert_eligible(record: &EnrichedRecord) -> bool {
    record.is_open()
        && record
            .days_elapsed
            .is_some_and(|days| days >= ALERT_MIN_DAYS_ELAPSED)
}

/// Eligible records in their original order
pub fn select_for_alert(records: &[EnrichedRecord]) -> Vec<EnrichedRecord> {
    records
        .iter()
        .filter(|r| is_alert_eligible(r))
        .cloned()
        .collect()
}
