pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::config::Config;
use crate::processing::TriageProcessor;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<TriageProcessor>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(processor: Arc<TriageProcessor>, config: Arc<Config>) -> Self {
        Self { processor, config }
    }
}
