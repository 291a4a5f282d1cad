use crate::config::NotificationConfig;
use crate::error::{AppError, Result};
use crate::notifications::{AlertMessage, AlertTransport};
use async_trait::async_trait;
use lettre::message::{header, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{error, info, warn};

/// SMTP alert transport
#[derive(Clone)]
pub struct EmailSender {
    pub(crate) smtp_server: String,
    pub(crate) smtp_port: u16,
    pub(crate) smtp_username: Option<String>,
    pub(crate) smtp_password: Option<String>,
    pub(crate) from_email: String,
    pub(crate) from_name: Option<String>,
    pub(crate) use_tls: bool,
}

impl std::fmt::Debug for EmailSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailSender")
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("from_email", &self.from_email)
            .field("use_tls", &self.use_tls)
            .finish_non_exhaustive()
    }
}

impl EmailSender {
    /// Create a new email sender
    pub fn new(
        smtp_server: String,
        smtp_port: u16,
        smtp_username: Option<String>,
        smtp_password: Option<String>,
        from_email: String,
        from_name: Option<String>,
        use_tls: bool,
    ) -> Result<Self> {
        if smtp_server.is_empty() {
            return Err(AppError::Configuration(
                "SMTP server cannot be empty".to_string(),
            ));
        }

        if from_email.is_empty() {
            return Err(AppError::Configuration(
                "From email cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            smtp_server,
            smtp_port,
            smtp_username,
            smtp_password,
            from_email,
            from_name,
            use_tls,
        })
    }

    /// Build a sender from notification settings.
    ///
    /// Returns `None` when email is disabled or the server or sender address
    /// is not configured. Credentials are read from the named environment
    /// variables.
    pub fn from_config(config: &NotificationConfig) -> Result<Option<Self>> {
        if !config.email_enabled {
            return Ok(None);
        }

        let (Some(server), Some(from)) = (config.smtp_server.as_ref(), config.email_from.as_ref())
        else {
            warn!("Email alerts enabled but SMTP server or from address not configured");
            return Ok(None);
        };

        let read_env = |name: &Option<String>| {
            name.as_ref().and_then(|env_var| std::env::var(env_var).ok())
        };

        Self::new(
            server.clone(),
            config.smtp_port,
            read_env(&config.smtp_username_env),
            read_env(&config.smtp_password_env),
            from.clone(),
            config.email_from_name.clone(),
            config.smtp_use_tls,
        )
        .map(Some)
    }

    /// Build email message with HTML and plain text parts
    fn build_email_message(&self, alert: &AlertMessage) -> Result<Message> {
        let from_mailbox = match &self.from_name {
            Some(name) => format!("{} <{}>", name, self.from_email),
            None => self.from_email.clone(),
        };

        let from = from_mailbox
            .parse()
            .map_err(|e| AppError::Configuration(format!("Invalid from address: {}", e)))?;

        let mut message_builder = Message::builder().from(from).subject(alert.subject.as_str());

        for addr in &alert.recipients {
            let mailbox = addr.parse().map_err(|e| {
                AppError::Validation(format!("Invalid recipient address '{}': {}", addr, e))
            })?;
            message_builder = message_builder.to(mailbox);
        }

        message_builder
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(alert.text_body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(alert.html_body.clone()),
                    ),
            )
            .map_err(|e| AppError::Notification(format!("Failed to build email: {}", e)))
    }
}

#[async_trait]
impl AlertTransport for EmailSender {
    fn name(&self) -> &str {
        "email"
    }

    async fn deliver(&self, alert: &AlertMessage) -> Result<()> {
        if alert.recipients.is_empty() {
            return Err(AppError::Validation("No recipients specified".to_string()));
        }

        let message = self.build_email_message(alert)?;

        let result = tokio::task::spawn_blocking({
            let smtp_server = self.smtp_server.clone();
            let smtp_port = self.smtp_port;
            let username = self.smtp_username.clone();
            let password = self.smtp_password.clone();
            let use_tls = self.use_tls;

            move || {
                let mut transport_builder = if use_tls {
                    SmtpTransport::relay(&smtp_server)
                } else {
                    SmtpTransport::starttls_relay(&smtp_server)
                }
                .map_err(|e| AppError::Configuration(format!("Invalid SMTP server: {}", e)))?
                .port(smtp_port);

                if let (Some(user), Some(pass)) = (username, password) {
                    transport_builder = transport_builder.credentials(Credentials::new(user, pass));
                }

                transport_builder
                    .build()
                    .send(&message)
                    .map_err(|e| AppError::Notification(format!("Failed to send email: {}", e)))?;

                Ok::<(), AppError>(())
            }
        })
        .await
        .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?;

        match result {
            Ok(()) => {
                info!(
                    recipients = ?alert.recipients,
                    subject = %alert.subject,
                    "Alert email sent"
                );
                Ok(())
            }
            Err(e) => {
                error!(
                    recipients = ?alert.recipients,
                    error = %e,
                    "Failed to send alert email"
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> EmailSender {
        EmailSender::new(
            "smtp.example.com".to_string(),
            465,
            None,
            None,
            "alerts@example.com".to_string(),
            Some("ICSS Team".to_string()),
            true,
        )
        .unwrap()
    }

    fn alert(recipients: Vec<&str>) -> AlertMessage {
        AlertMessage {
            recipients: recipients.into_iter().map(String::from).collect(),
            subject: "OPEN Incidents (3+ days)".to_string(),
            html_body: "<p>body</p>".to_string(),
            text_body: "body".to_string(),
        }
    }

    #[test]
    fn test_email_sender_validation() {
        let result = EmailSender::new(
            "".to_string(),
            465,
            None,
            None,
            "alerts@example.com".to_string(),
            None,
            true,
        );
        assert!(result.is_err());

        let result = EmailSender::new(
            "smtp.example.com".to_string(),
            465,
            None,
            None,
            "".to_string(),
            None,
            true,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_from_config_disabled() {
        let config = NotificationConfig::default();
        assert!(EmailSender::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_from_config_incomplete() {
        let config = NotificationConfig {
            email_enabled: true,
            smtp_server: Some("smtp.example.com".to_string()),
            ..Default::default()
        };
        assert!(EmailSender::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_build_message() {
        let message = sender()
            .build_email_message(&alert(vec!["owner@example.com", "qa@example.com"]))
            .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("owner@example.com"));
        assert!(raw.contains("ICSS Team"));
        assert!(raw.contains("multipart/alternative"));
    }

    #[test]
    fn test_invalid_recipient_rejected() {
        let err = sender()
            .build_email_message(&alert(vec!["not an address"]))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_deliver_without_recipients_fails() {
        let err = sender().deliver(&alert(vec![])).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
