//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDate};
use component_triage::{
    api::{build_router, AppState},
    catalog::{CatalogEntry, ComponentCatalog},
    config::{Config, NotificationConfig},
    enrichment::DateNormalizer,
    error::{AppError, Result},
    notifications::{AlertMessage, AlertTransport, NotificationService},
    processing::TriageProcessor,
};
use std::sync::{Arc, Mutex};

pub const CATALOG_CSV: &str = "\
Component,Severity (S),Occurrence (O),Detection (D)
Turbocharger,8,5,6
Radiator,6,3,4
Fuel Pump,8,3,5
Alternator,5,4,3
";

pub fn catalog() -> Arc<ComponentCatalog> {
    Arc::new(ComponentCatalog::from_reader(CATALOG_CSV.as_bytes()).unwrap())
}

pub fn turbo_only_catalog() -> Arc<ComponentCatalog> {
    Arc::new(ComponentCatalog::new(vec![CatalogEntry::new("Turbocharger", 8, 5, 6)]).unwrap())
}

pub fn processor() -> TriageProcessor {
    TriageProcessor::new(catalog(), 4).unwrap()
}

/// Normalizer pinned to 9 March 2024, noon
pub fn fixed_normalizer() -> DateNormalizer {
    DateNormalizer::new(
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap(),
    )
}

/// Creation date `days` days before today, day-first
pub fn days_ago(days: i64) -> String {
    (Local::now() - Duration::days(days))
        .format("%d/%m/%Y")
        .to_string()
}

/// Table whose dates are relative to the real current time
pub fn live_table_csv() -> String {
    format!(
        "Incident Id,Observation,Creation Date,Incident Status,Engine no,Service Dealer Name\n\
         INC-1,turbo charger failure noted,{},Open,E-100,North Motors\n\
         INC-2,random noise issue,{},Closed,E-200,South Motors\n\
         INC-3,SPN 5246 radiator leak,{},Pending,E-300,East Motors\n\
         INC-4,spn alternator belt slipping,31-02-2024,Open,E-400,West Motors\n",
        days_ago(4),
        days_ago(10),
        days_ago(1),
    )
}

pub fn notification_config() -> NotificationConfig {
    let mut config = NotificationConfig {
        email_from: Some("alerts@example.com".to_string()),
        cc: Some("quality@example.com".to_string()),
        ..Default::default()
    };
    config
        .routes
        .insert("BSIV".to_string(), vec!["bsiv-owner@example.com".to_string()]);
    config
}

pub fn router_with(processor: TriageProcessor) -> axum::Router {
    build_router(AppState::new(Arc::new(processor), Arc::new(Config::default())))
}

/// Transport that records every message it is handed
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<AlertMessage>>,
}

impl RecordingTransport {
    pub fn messages(&self) -> Vec<AlertMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlertTransport for RecordingTransport {
    fn name(&self) -> &str {
        "recording"
    }

    async fn deliver(&self, alert: &AlertMessage) -> Result<()> {
        self.sent.lock().unwrap().push(alert.clone());
        Ok(())
    }
}

/// Transport that always fails
pub struct FailingTransport;

#[async_trait]
impl AlertTransport for FailingTransport {
    fn name(&self) -> &str {
        "failing"
    }

    async fn deliver(&self, _alert: &AlertMessage) -> Result<()> {
        Err(AppError::Notification("connection refused".to_string()))
    }
}

pub fn service_with(transport: Arc<dyn AlertTransport>) -> Arc<NotificationService> {
    Arc::new(NotificationService::with_transport(
        notification_config(),
        transport,
    ))
}
