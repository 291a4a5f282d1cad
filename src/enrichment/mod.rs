/// Record enrichment
///
/// This module turns raw complaint rows into enriched records:
/// - Day-first date normalization and elapsed-day computation
/// - Optional creation-date range filtering
/// - Component matching, risk lookup and priority classification
/// - Bounded parallel execution with order-preserving results

pub mod dates;
pub mod pipeline;

pub use dates::{parse_day_first, DateNormalizer, DateRange};
pub use pipeline::RecordPipeline;
