use crate::catalog::ComponentCatalog;
use crate::enrichment::dates::{DateNormalizer, DateRange};
use crate::error::{AppError, Result};
use crate::matching::ComponentMatcher;
use crate::models::{EnrichedRecord, IncidentRecord, PriorityTier};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Month label format (`Jan`, `Feb`, ...)
const MONTH_FORMAT: &str = "%b";

/// Enriches incident records on a fixed-size worker pool.
///
/// Records are independent of each other; results come back in input order
/// regardless of which worker finished first.
pub struct RecordPipeline {
    matcher: ComponentMatcher,
    pool: Arc<ThreadPool>,
    worker_threads: usize,
}

impl RecordPipeline {
    /// Create a pipeline over a shared catalog
    pub fn new(catalog: Arc<ComponentCatalog>, worker_threads: usize) -> Result<Self> {
        let worker_threads = worker_threads.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(worker_threads)
            .thread_name(|idx| format!("triage-worker-{}", idx))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build worker pool: {}", e)))?;

        debug!(worker_threads, "Record pipeline worker pool created");

        Ok(Self {
            matcher: ComponentMatcher::new(catalog),
            pool: Arc::new(pool),
            worker_threads,
        })
    }

    /// Catalog the pipeline scores against
    pub fn catalog(&self) -> &Arc<ComponentCatalog> {
        self.matcher.catalog()
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    /// Enrich records against the current time
    pub fn run(
        &self,
        records: Vec<IncidentRecord>,
        date_range: Option<DateRange>,
    ) -> Result<Vec<EnrichedRecord>> {
        self.run_with(records, date_range, DateNormalizer::at_current_time())
    }

    /// Enrich records with elapsed days measured by `normalizer`.
    ///
    /// A panic inside a worker aborts the whole run; no partial output is
    /// returned.
    pub fn run_with(
        &self,
        records: Vec<IncidentRecord>,
        date_range: Option<DateRange>,
        normalizer: DateNormalizer,
    ) -> Result<Vec<EnrichedRecord>> {
        let start = Instant::now();
        let input_count = records.len();

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            self.pool.install(|| {
                records
                    .into_par_iter()
                    .filter_map(|record| self.enrich(record, date_range.as_ref(), &normalizer))
                    .collect::<Vec<_>>()
            })
        }));

        let enriched = outcome.map_err(|panic| {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(reason = %reason, "Record enrichment aborted");
            AppError::Processing(format!("Record enrichment failed: {}", reason))
        })?;

        info!(
            input_records = input_count,
            enriched_records = enriched.len(),
            filtered_out = input_count - enriched.len(),
            date_range = ?date_range,
            duration_ms = start.elapsed().as_millis() as u64,
            "Record enrichment completed"
        );

        Ok(enriched)
    }

    /// Enrich a single record; `None` when the date range excludes it
    pub fn enrich(
        &self,
        record: IncidentRecord,
        date_range: Option<&DateRange>,
        normalizer: &DateNormalizer,
    ) -> Option<EnrichedRecord> {
        let normalized = normalizer.normalize_date(&record.creation_date_raw);

        if let Some(range) = date_range {
            match normalized {
                Some((date, _)) if range.contains(date) => {}
                _ => return None,
            }
        }

        let month = normalized.map(|(date, _)| date.format(MONTH_FORMAT).to_string());

        let matched_component = self.matcher.match_component(&record.observation);
        let risk = self.catalog().risk_of(&matched_component);
        let risk_number = risk.risk_number();
        let priority = PriorityTier::classify(risk_number);

        Some(EnrichedRecord {
            record,
            matched_component,
            risk,
            risk_number,
            priority,
            normalized_creation_date: normalized.map(|(date, _)| date),
            days_elapsed: normalized.map(|(_, days)| days),
            month,
        })
    }
}
