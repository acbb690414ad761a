//! survey-agent - command-line client for field agents.
//!
//! Captures price submissions from JSON files, keeps them in the local queue
//! while offline, and delivers them when the server is reachable.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use price_survey::client::api_client::HttpSurveyApi;
use price_survey::client::config::Config;
use price_survey::client::geolocation::FixedLocation;
use price_survey::client::local_db::LocalDatabase;
use price_survey::client::offline::{DrainReport, OfflineManager};
use price_survey::client::sync::ConnectivityMonitor;
use price_survey::shared::{AppConfig, GeoFix, SubmissionDraft};

mod draft_file;

/// Price survey field agent
#[derive(Parser)]
#[command(name = "survey-agent")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Submissions server URL
    #[arg(long, env = "SURVEY_API_URL", global = true, default_value = "http://127.0.0.1:3000")]
    server_url: String,

    /// Local queue database (defaults to the platform data directory)
    #[arg(long, env = "SURVEY_QUEUE_PATH", global = true)]
    queue_path: Option<PathBuf>,

    /// Treat the device as offline without probing the server
    #[arg(long, global = true)]
    offline: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a price survey from a JSON file
    Submit {
        /// Submission draft (camelCase JSON)
        file: PathBuf,

        /// Latitude of the outlet
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude of the outlet
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,

        /// Accuracy of the fix in metres
        #[arg(long, requires = "lat")]
        accuracy: Option<f64>,
    },

    /// List submissions waiting in the local queue
    Pending,

    /// Retry every queued submission now
    Retry,

    /// Show the product catalogue served by the server
    Products,

    /// Keep running and deliver the queue whenever the server comes back
    Watch {
        /// How often to check reachability, in seconds
        #[arg(long, default_value_t = 15)]
        interval: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mut builder = AppConfig::builder().server_url(cli.server_url.as_str());
    if let Some(path) = &cli.queue_path {
        builder = builder.queue_path(path);
    }
    let config = Config::with_builder(builder).context("invalid configuration")?;
    let api = HttpSurveyApi::new(config.clone());

    if let Commands::Products = cli.command {
        let catalogue = api
            .fetch_products()
            .await
            .context("failed to fetch the product catalogue")?;
        for product in catalogue.items {
            println!("{}", product);
        }
        return Ok(());
    }

    let online = if cli.offline { false } else { api.probe().await };
    tracing::info!("[AGENT] Server {} is {}", config.server_url(), if online { "reachable" } else { "unreachable" });

    let queue_path = config.queue_path();
    let store = LocalDatabase::open(&queue_path)
        .await
        .with_context(|| format!("failed to open queue at {}", queue_path.display()))?;
    let manager = Arc::new(OfflineManager::new(
        Arc::new(store),
        Arc::new(api.clone()),
        ConnectivityMonitor::new(online),
        config.app(),
    ));

    match cli.command {
        Commands::Submit {
            file,
            lat,
            lng,
            accuracy,
        } => {
            let draft: SubmissionDraft = draft_file::load(&file)?;
            let outcome = match (lat, lng) {
                (Some(lat), Some(lng)) => {
                    let fix = FixedLocation(GeoFix { lat, lng, accuracy });
                    manager.capture_and_submit(draft, &fix).await
                }
                _ => manager.submit(draft).await,
            };
            match outcome {
                Ok(outcome) => println!("{}", outcome),
                Err(e) => {
                    for issue in e.issues() {
                        eprintln!("  {}: {}", issue.field, issue.message);
                    }
                    return Err(e).context("submission failed");
                }
            }
        }
        Commands::Pending => {
            let pending = manager.pending().await?;
            if pending.is_empty() {
                println!("No pending submissions");
            }
            for record in pending {
                println!(
                    "{}  {}  {}  retries={}{}",
                    record.id,
                    record.draft.collection_day(),
                    record.draft.outlet_name,
                    record.retry_count,
                    record
                        .last_error
                        .as_deref()
                        .map(|e| format!("  last error: {}", e))
                        .unwrap_or_default()
                );
            }
        }
        Commands::Retry => {
            let report = manager.drain_all().await.context("retry failed")?;
            print_report(&report);
        }
        Commands::Products => {}
        Commands::Watch { interval } => {
            watch(manager, api, Duration::from_secs(interval.max(1))).await?;
        }
    }

    Ok(())
}

/// Probe the server on an interval and let the auto-drain do the rest
async fn watch(manager: Arc<OfflineManager>, api: HttpSurveyApi, interval: Duration) -> Result<()> {
    let mut reports = manager.subscribe_reports();
    let _auto_drain = manager.spawn_auto_drain();

    if manager.is_online() && manager.pending_count().await? > 0 {
        print_report(&manager.drain_all().await?);
    }

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                manager.connectivity().set_online(api.probe().await);
            }
            report = reports.recv() => {
                if let Ok(report) = report {
                    print_report(&report);
                }
            }
            _ = &mut shutdown => {
                tracing::info!("[AGENT] Stopping");
                return Ok(());
            }
        }
    }
}

fn print_report(report: &DrainReport) {
    println!(
        "Sent {} of {} queued submissions ({} failed)",
        report.success_count,
        report.attempted(),
        report.failed_count
    );
    if report.interrupted {
        println!("Connection lost before the queue was finished");
    }
    for failure in &report.permanent_failures {
        println!(
            "  {} ({}): {}. Please re-enter it or contact support.",
            failure.outlet_name, failure.pending_id, failure.reason
        );
    }
}
