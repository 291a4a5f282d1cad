//! Prometheus metrics for the triage service.
//!
//! Counters live in a process-wide registry and are exported in the text
//! exposition format by [`gather_metrics`].

use lazy_static::lazy_static;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};
use std::sync::Once;

const NAMESPACE: &str = "component_triage";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    /// Report runs by outcome
    ///
    /// Labels: source (http, cli), outcome (success, error)
    pub static ref REPORT_RUNS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("report_runs_total", "Total number of report runs").namespace(NAMESPACE),
        &["source", "outcome"]
    ).expect("Failed to create REPORT_RUNS_TOTAL metric");

    /// Report run duration in seconds
    ///
    /// Labels: source
    pub static ref REPORT_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new("report_duration_seconds", "Report generation duration in seconds")
            .namespace(NAMESPACE)
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["source"]
    ).expect("Failed to create REPORT_DURATION_SECONDS metric");

    /// Records retained after filtering, by priority tier
    ///
    /// Labels: priority
    pub static ref RECORDS_PROCESSED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("records_processed_total", "Total number of enriched records").namespace(NAMESPACE),
        &["priority"]
    ).expect("Failed to create RECORDS_PROCESSED_TOTAL metric");

    /// Records whose observation matched no catalog component
    ///
    /// Labels: group (SPN, Non-SPN)
    pub static ref UNMATCHED_RECORDS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("unmatched_records_total", "Records with no matching component").namespace(NAMESPACE),
        &["group"]
    ).expect("Failed to create UNMATCHED_RECORDS_TOTAL metric");

    /// Alert dispatch attempts
    ///
    /// Labels: outcome (sent, failed, no_alerts, transport_disabled, no_recipients)
    pub static ref ALERT_DISPATCH_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("alert_dispatch_total", "Total number of alert dispatch attempts").namespace(NAMESPACE),
        &["outcome"]
    ).expect("Failed to create ALERT_DISPATCH_TOTAL metric");
}

static INIT: Once = Once::new();

/// Register every metric with [`PROMETHEUS_REGISTRY`].
///
/// Safe to call more than once; only the first call registers.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    let mut result = Ok(());
    INIT.call_once(|| {
        result = register_all();
    });
    result
}

fn register_all() -> Result<(), prometheus::Error> {
    PROMETHEUS_REGISTRY.register(Box::new(REPORT_RUNS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(REPORT_DURATION_SECONDS.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(RECORDS_PROCESSED_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(UNMATCHED_RECORDS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(ALERT_DISPATCH_TOTAL.clone()))?;

    tracing::info!("Prometheus metrics registered");
    Ok(())
}

/// Gather all metrics in Prometheus text format
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        assert!(init_metrics().is_ok());
        assert!(init_metrics().is_ok());
    }

    #[test]
    fn test_gather_includes_namespace() {
        init_metrics().unwrap();
        REPORT_RUNS_TOTAL.with_label_values(&["cli", "success"]).inc();

        let text = gather_metrics();
        assert!(text.contains("component_triage_report_runs_total"));
    }

    #[test]
    fn test_unmatched_counter_is_integral() {
        init_metrics().unwrap();
        let before = UNMATCHED_RECORDS_TOTAL.with_label_values(&["SPN"]).get();
        UNMATCHED_RECORDS_TOTAL.with_label_values(&["SPN"]).inc();

        let after: u64 = UNMATCHED_RECORDS_TOTAL.with_label_values(&["SPN"]).get();
        assert!(after > before);
        assert!(gather_metrics().contains("component_triage_unmatched_records_total"));
    }
}
