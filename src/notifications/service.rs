use crate::config::NotificationConfig;
use crate::error::Result;
use crate::metrics::ALERT_DISPATCH_TOTAL;
use crate::models::EnrichedRecord;
use crate::notifications::{AlertDigest, AlertMessage, AlertTransport, EmailSender};
use chrono::Local;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Result of one alert attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertOutcome {
    /// Alert handed to the transport
    Sent { recipients: Vec<String> },
    /// Nothing was sent
    Skipped { reason: SkipReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SkipReason {
    NoAlerts,
    TransportDisabled,
    NoRecipients,
}

/// Routes aging-incident digests to the configured recipients
pub struct NotificationService {
    config: NotificationConfig,
    transport: Option<Arc<dyn AlertTransport>>,
}

impl NotificationService {
    /// Service using the SMTP transport when email is enabled
    pub fn new(config: NotificationConfig) -> Result<Self> {
        let transport = EmailSender::from_config(&config)?
            .map(|sender| Arc::new(sender) as Arc<dyn AlertTransport>);

        info!(
            email_enabled = transport.is_some(),
            routes = config.routes.len(),
            "Notification service initialized"
        );

        Ok(Self { config, transport })
    }

    /// Service using an explicit transport
    pub fn with_transport(config: NotificationConfig, transport: Arc<dyn AlertTransport>) -> Self {
        Self {
            config,
            transport: Some(transport),
        }
    }

    /// Service that never sends anything
    pub fn disabled() -> Self {
        Self {
            config: NotificationConfig::default(),
            transport: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Build and deliver the digest for `alerts`
    pub async fn send_alert(
        &self,
        alerts: &[EnrichedRecord],
        category: Option<&str>,
    ) -> Result<AlertOutcome> {
        let Some(transport) = &self.transport else {
            return Ok(AlertOutcome::Skipped {
                reason: SkipReason::TransportDisabled,
            });
        };

        let Some(digest) = AlertDigest::build(alerts, category, Local::now()) else {
            return Ok(AlertOutcome::Skipped {
                reason: SkipReason::NoAlerts,
            });
        };

        let recipients = self.config.recipients_for(category);
        if recipients.is_empty() {
            warn!(category = ?category, "No alert recipients configured");
            return Ok(AlertOutcome::Skipped {
                reason: SkipReason::NoRecipients,
            });
        }

        let message = AlertMessage {
            recipients: recipients.clone(),
            subject: digest.subject(),
            html_body: digest.to_html(),
            text_body: digest.to_plain_text(),
        };

        transport.deliver(&message).await?;

        info!(
            transport = transport.name(),
            category = ?category,
            alerts = alerts.len(),
            recipients = ?recipients,
            "Aging-incident alert sent"
        );

        Ok(AlertOutcome::Sent { recipients })
    }

    /// Send the alert on a background task.
    ///
    /// Failures are logged and counted, never returned to the caller.
    pub fn dispatch_detached(
        self: &Arc<Self>,
        alerts: Vec<EnrichedRecord>,
        category: Option<String>,
    ) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            match service.send_alert(&alerts, category.as_deref()).await {
                Ok(AlertOutcome::Sent { .. }) => {
                    ALERT_DISPATCH_TOTAL.with_label_values(&["sent"]).inc();
                }
                Ok(AlertOutcome::Skipped { reason }) => {
                    ALERT_DISPATCH_TOTAL
                        .with_label_values(&[&reason.to_string()])
                        .inc();
                }
                Err(e) => {
                    ALERT_DISPATCH_TOTAL.with_label_values(&["failed"]).inc();
                    error!(
                        category = ?category,
                        alerts = alerts.len(),
                        error = %e,
                        "Aging-incident alert failed"
                    );
                }
            }
        })
    }
}
