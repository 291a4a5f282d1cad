use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Component catalog configuration
    pub catalog: CatalogConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,

    /// Processing configuration
    pub processing: ProcessingConfig,

    /// Notification configuration
    pub notifications: NotificationConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: TRIAGE_)
            .add_source(
                config::Environment::with_prefix("TRIAGE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Report generation timeout (seconds), 0 disables it
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum accepted upload size (bytes)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            request_timeout_secs: default_request_timeout(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path to the component catalog CSV
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Service name
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            service_name: default_service_name(),
            prometheus_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Worker threads used for matching and risk lookup
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            worker_threads: default_worker_threads(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Enable email alerts
    #[serde(default)]
    pub email_enabled: bool,

    /// SMTP server
    pub smtp_server: Option<String>,

    /// SMTP port
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// Use implicit TLS for SMTP
    #[serde(default = "default_true")]
    pub smtp_use_tls: bool,

    /// SMTP username (from env var)
    pub smtp_username_env: Option<String>,

    /// SMTP password (from env var)
    pub smtp_password_env: Option<String>,

    /// From email address
    pub email_from: Option<String>,

    /// From email name
    pub email_from_name: Option<String>,

    /// Address copied on every alert
    pub cc: Option<String>,

    /// Emission category -> recipient addresses
    #[serde(default)]
    pub routes: HashMap<String, Vec<String>>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            email_enabled: false,
            smtp_server: None,
            smtp_port: default_smtp_port(),
            smtp_use_tls: true,
            smtp_username_env: None,
            smtp_password_env: None,
            email_from: None,
            email_from_name: None,
            cc: None,
            routes: HashMap::new(),
        }
    }
}

impl NotificationConfig {
    /// Recipients for an emission category; unknown categories go to the sender
    pub fn recipients_for(&self, category: Option<&str>) -> Vec<String> {
        // config-rs may fold map keys to lower case, so match case-insensitively
        let mut recipients = category
            .and_then(|c| {
                self.routes
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(c))
                    .map(|(_, addresses)| addresses)
            })
            .filter(|r| !r.is_empty())
            .cloned()
            .or_else(|| self.email_from.clone().map(|from| vec![from]))
            .unwrap_or_default();

        if let Some(cc) = &self.cc {
            recipients.push(cc.clone());
        }
        recipients
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    5000
}

fn default_request_timeout() -> u64 {
    120
}

fn default_max_upload_bytes() -> usize {
    32 * 1024 * 1024
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("data/rpn.csv")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "component-triage".to_string()
}

fn default_true() -> bool {
    true
}

fn default_worker_threads() -> usize {
    4
}

fn default_smtp_port() -> u16 {
    465
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        assert_eq!(default_http_port(), 5000);
        assert_eq!(default_worker_threads(), 4);
        assert_eq!(default_log_level(), "info");
        assert!(default_true());
    }

    #[test]
    fn test_embedded_defaults_deserialize() {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.processing.worker_threads, 4);
        assert!(!config.notifications.email_enabled);
        assert_eq!(config.catalog.path, PathBuf::from("data/rpn.csv"));
    }

    #[test]
    fn test_recipients_routed_by_category() {
        let mut config = NotificationConfig {
            email_from: Some("alerts@example.com".to_string()),
            cc: Some("quality@example.com".to_string()),
            ..Default::default()
        };
        config
            .routes
            .insert("BSIV".to_string(), vec!["bsiv-owner@example.com".to_string()]);

        assert_eq!(
            config.recipients_for(Some("BSIV")),
            vec!["bsiv-owner@example.com", "quality@example.com"]
        );
        assert_eq!(
            config.recipients_for(Some("unmapped")),
            vec!["alerts@example.com", "quality@example.com"]
        );
        assert_eq!(
            config.recipients_for(None),
            vec!["alerts@example.com", "quality@example.com"]
        );
    }
}
