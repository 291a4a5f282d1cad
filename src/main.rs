use component_triage::{
    api::{build_router, AppState},
    catalog::ComponentCatalog,
    config::Config,
    notifications::NotificationService,
    processing::TriageProcessor,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        Config::default()
    });

    init_tracing(&config);

    tracing::info!(
        "Starting {} v{}",
        config.observability.service_name,
        env!("CARGO_PKG_VERSION")
    );

    // Initialize Prometheus metrics
    if config.observability.prometheus_enabled {
        if let Err(e) = component_triage::metrics::init_metrics() {
            tracing::warn!("Failed to initialize metrics: {}", e);
            tracing::warn!("Continuing without metrics");
        } else {
            tracing::info!("✅ Prometheus metrics initialized");
        }
    } else {
        tracing::info!("⚠️  Prometheus metrics disabled in configuration");
    }

    // The catalog is required; refuse to start without it
    let catalog = match ComponentCatalog::from_path(&config.catalog.path) {
        Ok(catalog) => Arc::new(catalog),
        Err(e) => {
            tracing::error!(
                path = %config.catalog.path.display(),
                error = %e,
                "Failed to load component catalog"
            );
            return Err(e.into());
        }
    };
    tracing::info!("✅ Component catalog loaded ({} components)", catalog.len());

    let notification_service = Arc::new(NotificationService::new(config.notifications.clone())?);
    tracing::info!("✅ Notification service initialized");

    let processor = Arc::new(
        TriageProcessor::new(catalog, config.processing.worker_threads)?
            .with_notifications(notification_service),
    );
    tracing::info!(
        workers = config.processing.worker_threads,
        "✅ Triage processor initialized"
    );

    let config = Arc::new(config);
    let app = build_router(AppState::new(processor, config.clone()));

    // Start HTTP server
    let http_addr = format!("{}:{}", config.server.host, config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("🚀 HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("   Reports: http://{}/v1/reports", http_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let http_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(http_listener, app).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    tokio::select! {
        _ = http_handle => {
            tracing::warn!("HTTP server stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    tracing::info!("Shutting down gracefully...");
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "component_triage={},tower_http=info",
            config.observability.log_level
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.observability.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
