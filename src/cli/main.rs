use anyhow::Context;
use clap::{Parser, Subcommand};
use component_triage::{
    catalog::ComponentCatalog,
    config::Config,
    enrichment::DateRange,
    ingest::IncidentTable,
    matching::ComponentMatcher,
    metrics::{REPORT_DURATION_SECONDS, REPORT_RUNS_TOTAL},
    models::PriorityTier,
    notifications::NotificationService,
    processing::{TriageProcessor, TriageRequest},
    report::write_report_csv,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "triage-cli")]
#[command(about = "Component triage CLI", long_about = None)]
struct Cli {
    /// Component catalog CSV (defaults to the configured path)
    #[arg(short, long, global = true, env = "TRIAGE_CATALOG")]
    catalog: Option<PathBuf>,

    /// Worker threads (defaults to the configured count)
    #[arg(short, long, global = true)]
    workers: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the SPN / Non-SPN reports for an incident table
    Process {
        /// Incident table CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Inclusive lower creation-date bound
        #[arg(long)]
        from_date: Option<String>,

        /// Inclusive upper creation-date bound
        #[arg(long)]
        to_date: Option<String>,

        /// Emission category used for alert routing
        #[arg(long)]
        category: Option<String>,

        /// Output directory for the group CSVs
        #[arg(short, long, default_value = "reports")]
        out_dir: PathBuf,

        /// Send the aging-incident alert
        #[arg(long)]
        notify: bool,
    },

    /// Match one observation against the catalog
    Match {
        #[arg(short, long)]
        text: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "component_triage=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load().context("Failed to load configuration")?;

    let catalog_path = cli.catalog.unwrap_or_else(|| config.catalog.path.clone());
    let catalog = ComponentCatalog::from_path(&catalog_path)
        .with_context(|| format!("Failed to load catalog from {}", catalog_path.display()))?;

    match cli.command {
        Commands::Process {
            input,
            from_date,
            to_date,
            category,
            out_dir,
            notify,
        } => {
            let workers = cli.workers.unwrap_or(config.processing.worker_threads);
            let mut processor = TriageProcessor::new(Arc::new(catalog), workers)?;
            if notify {
                let service = NotificationService::new(config.notifications.clone())?;
                if !service.is_enabled() {
                    eprintln!("⚠️  Email alerts are disabled in configuration");
                }
                processor = processor.with_notifications(Arc::new(service));
            }

            let date_range = DateRange::from_bounds(from_date.as_deref(), to_date.as_deref())?;
            let request = TriageRequest::new(date_range, category);

            let start = Instant::now();
            let table = IncidentTable::from_path(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let result = processor.process(table, &request);

            let outcome_label = if result.is_ok() { "success" } else { "error" };
            REPORT_RUNS_TOTAL
                .with_label_values(&["cli", outcome_label])
                .inc();
            REPORT_DURATION_SECONDS
                .with_label_values(&["cli"])
                .observe(start.elapsed().as_secs_f64());

            let outcome = result?;
            let written = write_report_csv(&outcome.report, &out_dir)?;

            println!("✅ Report {} generated", outcome.report.run_id);
            for group in &outcome.report.groups {
                println!("   {}: {} rows", group.name, group.len());
            }
            for path in written {
                println!("   wrote {}", path.display());
            }
            println!("   {} incident(s) open for 3+ days", outcome.alerts.len());

            // The CLI waits for delivery so the process does not exit mid-send
            if let Some(handle) = processor.dispatch_alerts(outcome.alerts, request.emission_category)
            {
                handle.await?;
            }
        }

        Commands::Match { text } => {
            let matcher = ComponentMatcher::new(Arc::new(catalog));

            let component = matcher.match_component(&text);
            let risk = matcher.catalog().risk_of(&component);
            let rpn = risk.risk_number();

            println!("Component: {}", component);
            if let Some(best) = matcher.best_match(&text) {
                println!("Score:     {:.1}", best.score);
            }
            println!(
                "S/O/D:     {}/{}/{}",
                risk.severity, risk.occurrence, risk.detection
            );
            println!("RPN:       {}", rpn);
            println!("Priority:  {}", PriorityTier::classify(rpn));
        }
    }

    Ok(())
}
