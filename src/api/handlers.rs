use crate::api::AppState;
use crate::enrichment::DateRange;
use crate::error::{AppError, Result};
use crate::ingest::IncidentTable;
use crate::metrics::{gather_metrics, REPORT_DURATION_SECONDS, REPORT_RUNS_TOTAL};
use crate::processing::{TriageOutcome, TriageRequest};
use crate::report::Report;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use validator::Validate;

/// Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Prometheus exposition endpoint
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        gather_metrics(),
    )
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ReportQuery {
    #[validate(length(max = 32))]
    pub from_date: Option<String>,

    #[validate(length(max = 32))]
    pub to_date: Option<String>,

    #[validate(length(max = 64))]
    pub emission_category: Option<String>,
}

/// Generate a triage report from an uploaded CSV table.
///
/// Aging-incident alerts are dispatched after the report is built and never
/// delay or fail the response.
pub async fn generate_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
    body: Bytes,
) -> Result<Json<Report>> {
    query.validate()?;

    let start = Instant::now();
    let result = run_report(&state, query, body).await;

    let outcome = if result.is_ok() { "success" } else { "error" };
    REPORT_RUNS_TOTAL.with_label_values(&["http", outcome]).inc();
    REPORT_DURATION_SECONDS
        .with_label_values(&["http"])
        .observe(start.elapsed().as_secs_f64());

    let (outcome, category) = result?;
    state
        .processor
        .dispatch_alerts(outcome.alerts, category);

    Ok(Json(outcome.report))
}

async fn run_report(
    state: &AppState,
    query: ReportQuery,
    body: Bytes,
) -> Result<(TriageOutcome, Option<String>)> {
    let date_range = DateRange::from_bounds(query.from_date.as_deref(), query.to_date.as_deref())?;
    let request = TriageRequest::new(date_range, query.emission_category);
    let category = request.emission_category.clone();

    let processor = state.processor.clone();
    let task = tokio::task::spawn_blocking(move || {
        let table = IncidentTable::from_reader(body.as_ref())?;
        processor.process(table, &request)
    });

    let timeout_secs = state.config.server.request_timeout_secs;
    let joined = if timeout_secs == 0 {
        task.await
    } else {
        tokio::time::timeout(Duration::from_secs(timeout_secs), task)
            .await
            .map_err(|_| {
                AppError::Timeout(format!("Report generation exceeded {}s", timeout_secs))
            })?
    };

    let outcome =
        joined.map_err(|e| AppError::Processing(format!("Report task failed: {}", e)))??;

    Ok((outcome, category))
}
