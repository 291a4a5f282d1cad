use crate::catalog::ComponentCatalog;
use crate::enrichment::{DateNormalizer, DateRange, RecordPipeline};
use crate::error::Result;
use crate::ingest::IncidentTable;
use crate::matching::UNKNOWN_COMPONENT;
use crate::metrics::{RECORDS_PROCESSED_TOTAL, UNMATCHED_RECORDS_TOTAL};
use crate::models::EnrichedRecord;
use crate::notifications::{select_for_alert, NotificationService};
use crate::report::{
    report_columns, segregate, sort_by_priority, Report, ReportGroup, NON_SPN_GROUP, SPN_GROUP,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Parameters of one triage run
#[derive(Debug, Clone, Default)]
pub struct TriageRequest {
    pub date_range: Option<DateRange>,
    pub emission_category: Option<String>,
}

impl TriageRequest {
    pub fn new(date_range: Option<DateRange>, emission_category: Option<String>) -> Self {
        Self {
            date_range,
            emission_category: emission_category.filter(|c| !c.trim().is_empty()),
        }
    }
}

/// Report plus the records selected for alerting
#[derive(Debug, Clone)]
pub struct TriageOutcome {
    pub report: Report,
    pub alerts: Vec<EnrichedRecord>,
}

/// Runs the full triage flow over an incident table
pub struct TriageProcessor {
    pipeline: RecordPipeline,
    notification_service: Option<Arc<NotificationService>>,
}

impl TriageProcessor {
    pub fn new(catalog: Arc<ComponentCatalog>, worker_threads: usize) -> Result<Self> {
        Ok(Self {
            pipeline: RecordPipeline::new(catalog, worker_threads)?,
            notification_service: None,
        })
    }

    /// Set the notification service used for aging-incident alerts
    pub fn with_notifications(mut self, notification_service: Arc<NotificationService>) -> Self {
        self.notification_service = Some(notification_service);
        self
    }

    /// Process a table against the current time.
    ///
    /// CPU-bound; async callers should run it on a blocking thread.
    pub fn process(&self, table: IncidentTable, request: &TriageRequest) -> Result<TriageOutcome> {
        self.process_with(table, request, DateNormalizer::at_current_time())
    }

    /// Process a table with elapsed days measured by `normalizer`
    pub fn process_with(
        &self,
        table: IncidentTable,
        request: &TriageRequest,
        normalizer: DateNormalizer,
    ) -> Result<TriageOutcome> {
        let run_id = Uuid::new_v4();
        let status_check = table.require_status_column();
        let IncidentTable { columns, records } = table;

        tracing::info!(
            run_id = %run_id,
            records = records.len(),
            date_range = ?request.date_range,
            emission_category = ?request.emission_category,
            "Processing incident table"
        );

        let enriched = self
            .pipeline
            .run_with(records, request.date_range, normalizer)?;

        status_check?;

        let alerts = select_for_alert(&enriched);
        record_metrics(&enriched);

        let (spn, non_spn) = segregate(enriched);
        let output_columns = report_columns(&columns);

        let groups = vec![
            ReportGroup::render(SPN_GROUP, &output_columns, &sort_by_priority(spn)),
            ReportGroup::render(NON_SPN_GROUP, &output_columns, &sort_by_priority(non_spn)),
        ];

        let report = Report {
            run_id,
            generated_at: Utc::now(),
            date_range: request.date_range,
            groups,
            alert_count: alerts.len(),
        };

        tracing::info!(
            run_id = %run_id,
            spn_rows = report.groups[0].len(),
            non_spn_rows = report.groups[1].len(),
            alerts = report.alert_count,
            "Report generated"
        );

        Ok(TriageOutcome { report, alerts })
    }

    /// Hand the alert records to the notification service on a detached task.
    ///
    /// Returns `None` when notifications are not configured or nothing is
    /// eligible. Must be called from within a Tokio runtime.
    pub fn dispatch_alerts(
        &self,
        alerts: Vec<EnrichedRecord>,
        emission_category: Option<String>,
    ) -> Option<JoinHandle<()>> {
        if alerts.is_empty() {
            return None;
        }

        let service = self.notification_service.as_ref()?;
        Some(service.dispatch_detached(alerts, emission_category))
    }
}

fn record_metrics(records: &[EnrichedRecord]) {
    for record in records {
        RECORDS_PROCESSED_TOTAL
            .with_label_values(&[&record.priority.to_string()])
            .inc();
        if record.matched_component == UNKNOWN_COMPONENT {
            let group = if crate::report::is_spn(record) {
                SPN_GROUP
            } else {
                NON_SPN_GROUP
            };
            UNMATCHED_RECORDS_TOTAL.with_label_values(&[group]).inc();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;
    use crate::error::AppError;
    use crate::models::PriorityTier;
    use chrono::NaiveDate;

    const TABLE: &str = "\
Incident Id,Observation,Creation Date,Incident Status
INC-1,turbo charger failure noted,01/03/2024,Open
INC-2,random noise issue,08/03/2024,Closed
INC-3,SPN 5246 radiator leak,31-02-2024,Pending
INC-4,spn fuel pump seized,06/03/2024,open
";

    fn processor() -> TriageProcessor {
        let catalog = ComponentCatalog::new(vec![
            CatalogEntry::new("Turbocharger", 8, 5, 6),
            CatalogEntry::new("Radiator", 6, 3, 4),
            CatalogEntry::new("Fuel Pump", 8, 3, 5),
        ])
        .unwrap();
        TriageProcessor::new(Arc::new(catalog), 2).unwrap()
    }

    fn normalizer() -> DateNormalizer {
        DateNormalizer::new(
            NaiveDate::from_ymd_opt(2024, 3, 9)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        )
    }

    fn table(csv: &str) -> IncidentTable {
        IncidentTable::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_groups_and_ordering() {
        let outcome = processor()
            .process_with(table(TABLE), &TriageRequest::default(), normalizer())
            .unwrap();
        let report = outcome.report;

        let spn = report.group(SPN_GROUP).unwrap();
        let non_spn = report.group(NON_SPN_GROUP).unwrap();
        assert_eq!(spn.len() + non_spn.len(), 4);

        // Fuel Pump (120, Moderate) sorts ahead of Radiator (72, Low)
        let id_idx = spn.columns.iter().position(|c| c == "Incident Id").unwrap();
        let spn_ids: Vec<_> = spn.rows.iter().map(|r| r.cells[id_idx].as_str()).collect();
        assert_eq!(spn_ids, vec!["INC-4", "INC-3"]);

        let non_spn_ids: Vec<_> = non_spn.rows.iter().map(|r| r.cells[id_idx].as_str()).collect();
        assert_eq!(non_spn_ids, vec!["INC-1", "INC-2"]);
    }

    #[test]
    fn test_alerts_selected() {
        let outcome = processor()
            .process_with(table(TABLE), &TriageRequest::default(), normalizer())
            .unwrap();

        // INC-1 is 8 days open, INC-4 is 3 days open, INC-3 has no date
        let ids: Vec<_> = outcome
            .alerts
            .iter()
            .map(|r| r.record.incident_id.as_str())
            .collect();
        assert_eq!(ids, vec!["INC-1", "INC-4"]);
        assert_eq!(outcome.report.alert_count, 2);
        assert_eq!(outcome.alerts[0].priority, PriorityTier::High);
    }

    #[test]
    fn test_date_range_drops_invalid_dates() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 6).unwrap(),
        );
        let outcome = processor()
            .process_with(
                table(TABLE),
                &TriageRequest::new(Some(range), None),
                normalizer(),
            )
            .unwrap();

        assert_eq!(outcome.report.total_rows(), 2);
    }

    #[test]
    fn test_missing_status_column_fails_run() {
        let csv = "Incident Id,Observation,Creation Date\nINC-1,noise,01/03/2024\n";
        let err = processor()
            .process_with(table(csv), &TriageRequest::default(), normalizer())
            .unwrap_err();

        assert!(matches!(err, AppError::MissingColumn(ref c) if c == "Incident Status"));
    }

    #[test]
    fn test_blank_category_is_none() {
        let request = TriageRequest::new(None, Some("  ".to_string()));
        assert!(request.emission_category.is_none());
    }

    #[test]
    fn test_dispatch_without_service_is_none() {
        let outcome = processor()
            .process_with(table(TABLE), &TriageRequest::default(), normalizer())
            .unwrap();
        assert!(processor().dispatch_alerts(outcome.alerts, None).is_none());
    }
}
