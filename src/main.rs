//! Node health stream cache: operator CLI.
//!
//! # Architecture Overview
//!
//! ```text
//!   get / watch                    ┌───────────────────────────────────────────┐
//!   ───────────────────────────────┼─▶ HealthCache::get(node)                  │
//!                                  │      │                                     │
//!                                  │      ▼ (first access)                      │
//!                                  │   streaming task ──▶ Directory            │
//!                                  │      │                 (config nodes)      │
//!                                  │      ▼                                     │
//!   ◀── latest HealthReport ───────┼── HealthRecord ◀── HealthDialer ◀─────────┼──── node
//!                                  │                    (tcp, line JSON)        │
//!                                  └───────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::time;

use health_stream_cache::config::{load_config, HealthCacheConfig};
use health_stream_cache::lifecycle::{build_cache, build_cache_under, signals, Shutdown};
use health_stream_cache::observability::{logging, metrics};
use health_stream_cache::{HealthError, NodeId};

#[derive(Parser)]
#[command(name = "health-cache")]
#[command(about = "Watch node health through a shared health stream cache", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured log level.
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the latest health report of one node
    Get {
        /// Node alias, e.g. zone1-0000000100
        node: NodeId,

        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },
    /// Print health reports of several nodes periodically until interrupted
    Watch {
        #[arg(required = true)]
        nodes: Vec<NodeId>,

        #[arg(long, default_value_t = 5)]
        interval_secs: u64,

        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },
    /// Validate the configuration and print it
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => HealthCacheConfig::default(),
    };

    let level = cli
        .log_level
        .as_deref()
        .unwrap_or(&config.observability.log_level);
    logging::init_logging(level);

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    match cli.command {
        Commands::CheckConfig => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
        Commands::Get { node, timeout_secs } => {
            let cache = build_cache(&config)?;
            let outcome = cache
                .get_timeout(&node, Duration::from_secs(timeout_secs))
                .await;
            cache.shutdown();

            match outcome? {
                Some(report) => println!("{}", serde_json::to_string_pretty(report.as_ref())?),
                None => println!("{}: stream closed before any health report", node),
            }
        }
        Commands::Watch {
            nodes,
            interval_secs,
            timeout_secs,
        } => {
            let shutdown = Shutdown::new();
            let cache = build_cache_under(&config, &shutdown)?;
            let stop = shutdown.token();

            tokio::spawn({
                let shutdown = shutdown.clone();
                async move {
                    signals::wait_for_signal().await;
                    shutdown.trigger();
                }
            });

            let timeout = Duration::from_secs(timeout_secs);
            let mut ticker = time::interval(Duration::from_secs(interval_secs.max(1)));

            loop {
                tokio::select! {
                    biased;
                    _ = stop.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                for node in &nodes {
                    match cache.get_with_deadline(&stop, node, timeout).await {
                        Ok(Some(report)) => {
                            let line = serde_json::json!({
                                "node": node.to_string(),
                                "healthy": report.is_healthy(),
                                "report": report.as_ref(),
                            });
                            println!("{}", line);
                        }
                        Ok(None) => {
                            tracing::warn!(node = %node, "Stream closed before any health report");
                        }
                        Err(HealthError::Cancelled) => break,
                        Err(e) => {
                            tracing::warn!(node = %node, error = %e, "Health read failed");
                        }
                    }
                }
            }

            cache.shutdown();
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
