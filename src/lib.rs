//! Component risk triage.
//!
//! Incident complaints are matched against a component catalog, scored by
//! risk priority number, grouped into SPN and Non-SPN reports and, when open
//! long enough, escalated by email.

pub mod api;
pub mod catalog;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod ingest;
pub mod matching;
pub mod metrics;
pub mod models;
pub mod notifications;
pub mod processing;
pub mod report;

pub use error::{AppError, Result};
