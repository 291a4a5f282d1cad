//! Aging-incident alerting.
//!
//! Open or pending incidents that have waited three or more days are
//! summarized into a digest and sent to the recipients routed for the
//! request's emission category. Delivery is best-effort and runs off the
//! request path.

pub mod digest;
pub mod email;
pub mod filter;
pub mod service;

pub use digest::{AlertDigest, ALERT_COLUMNS, ALERT_SUBJECT};
pub use email::EmailSender;
pub use filter::{is_alert_eligible, select_for_alert, ALERT_MIN_DAYS_ELAPSED};
pub use service::{AlertOutcome, NotificationService, SkipReason};

use crate::error::Result;
use async_trait::async_trait;

/// A rendered alert ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub recipients: Vec<String>,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// Delivery channel for alert messages
#[async_trait]
pub trait AlertTransport: Send + Sync {
    /// Transport name used in logs
    fn name(&self) -> &str;

    /// Deliver one message
    async fn deliver(&self, alert: &AlertMessage) -> Result<()>;
}
