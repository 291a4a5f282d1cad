pub mod processor;

pub use processor::{TriageOutcome, TriageProcessor, TriageRequest};
