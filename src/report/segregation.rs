use crate::models::EnrichedRecord;

/// Observation marker that routes a record to the SPN group
pub const SPN_MARKER: &str = "spn";

/// True when the observation mentions the SPN marker (case-insensitive)
pub fn is_spn(record: &EnrichedRecord) -> bool {
    record.record.observation.to_lowercase().contains(SPN_MARKER)
}

/// Split records into `(spn, non_spn)`, keeping relative order in each group
pub fn segregate(records: Vec<EnrichedRecord>) -> (Vec<EnrichedRecord>, Vec<EnrichedRecord>) {
    records.into_iter().partition(is_spn)
}

/// Stable sort by priority tier, most urgent first
pub fn sort_by_priority(mut group: Vec<EnrichedRecord>) -> Vec<EnrichedRecord> {
    group.sort_by_key(|r| r.priority);
    group
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IncidentRecord, PriorityTier, RiskTriple};

    fn record(id: &str, observation: &str, priority: PriorityTier) -> EnrichedRecord {
        EnrichedRecord {
            record: IncidentRecord::new(id, observation, ""),
            matched_component: "Unknown".to_string(),
            risk: RiskTriple::FALLBACK,
            risk_number: 10,
            priority,
            normalized_creation_date: None,
            days_elapsed: None,
            month: None,
        }
    }

    fn ids(records: &[EnrichedRecord]) -> Vec<&str> {
        records.iter().map(|r| r.record.incident_id.as_str()).collect()
    }

    #[test]
    fn test_segregate_by_marker() {
        let records = vec![
            record("1", "SPN 5246 active", PriorityTier::Low),
            record("2", "radiator leak", PriorityTier::Low),
            record("3", "fault spn-110", PriorityTier::Low),
            record("4", "", PriorityTier::Low),
        ];

        let (spn, non_spn) = segregate(records);

        assert_eq!(ids(&spn), vec!["1", "3"]);
        assert_eq!(ids(&non_spn), vec!["2", "4"]);
    }

    #[test]
    fn test_segregate_is_partition() {
        let records: Vec<_> = (0..50)
            .map(|i| {
                let text = if i % 3 == 0 { "Spn code" } else { "engine noise" };
                record(&i.to_string(), text, PriorityTier::Low)
            })
            .collect();
        let input_ids: Vec<String> = records.iter().map(|r| r.record.incident_id.clone()).collect();

        let (spn, non_spn) = segregate(records);

        assert_eq!(spn.len() + non_spn.len(), input_ids.len());
        for r in &spn {
            assert!(!non_spn.iter().any(|o| o.record.incident_id == r.record.incident_id));
        }
        let mut all: Vec<String> = spn
            .iter()
            .chain(non_spn.iter())
            .map(|r| r.record.incident_id.clone())
            .collect();
        all.sort();
        let mut expected = input_ids;
        expected.sort();
        assert_eq!(all, expected);
    }

    #[test]
    fn test_sort_orders_tiers() {
        let sorted = sort_by_priority(vec![
            record("a", "", PriorityTier::Low),
            record("b", "", PriorityTier::High),
            record("c", "", PriorityTier::Moderate),
        ]);
        assert_eq!(ids(&sorted), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let sorted = sort_by_priority(vec![
            record("low-1", "", PriorityTier::Low),
            record("high-1", "", PriorityTier::High),
            record("low-2", "", PriorityTier::Low),
            record("mod-1", "", PriorityTier::Moderate),
            record("high-2", "", PriorityTier::High),
            record("low-3", "", PriorityTier::Low),
        ]);
        assert_eq!(
            ids(&sorted),
            vec!["high-1", "high-2", "mod-1", "low-1", "low-2", "low-3"]
        );
    }
}
