//! Promsink Binary Entry Point
//!
//! This binary runs one export batch: window walk, staging, warehouse load.
//! Core functionality is provided by the `promsink` library crate.

use clap::Parser;
use promsink::{
    BigQueryWarehouse, ExportConfig, ExportRunner, MetricsConfig, ObjectStoreStaging, PromClient,
    TimeWindow,
    config::{parse_duration, parse_timestamp},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Promsink - batch export of Prometheus metrics into BigQuery
#[derive(Parser, Debug)]
#[command(name = "promsink", version, about, long_about = None)]
struct Cli {
    /// Destination GCS bucket for staged buffers
    #[arg(long, env = "BUCKET_NAME")]
    bucket: String,

    /// Destination BigQuery dataset
    #[arg(long, env = "DATA_SET", default_value = "test_prom")]
    dataset: String,

    /// Window start, ISO-8601 (inclusive)
    #[arg(long, env = "START")]
    start: String,

    /// Window end, ISO-8601 (exclusive)
    #[arg(long, env = "END")]
    end: String,

    /// Prometheus host
    #[arg(long, env = "HOST", default_value = "localhost")]
    host: String,

    /// Prometheus port
    #[arg(long, env = "PORT", default_value_t = 30090)]
    port: u16,

    /// Sample step (e.g. "60s", "5m")
    #[arg(long, env = "STEP", default_value = "60s")]
    step: String,

    /// Path to the metric definitions YAML file
    #[arg(long, env = "PROMSINK_METRICS", default_value = "configs/metrics.yaml")]
    metrics: String,

    /// Local workspace directory for buffer files
    #[arg(long, default_value = "var")]
    workspace: String,

    /// Staging key prefix inside the bucket
    #[arg(long, default_value = "prom_upload")]
    staging_prefix: String,

    /// GCP project for load jobs (defaults to the credential's project)
    #[arg(long, env = "GCP_PROJECT")]
    project: Option<String>,

    /// Enable debug logging
    #[arg(long, env = "DEBUG")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "info,promsink=debug"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let step = parse_duration(&cli.step).map_err(|e| format!("invalid step: {e}"))?;
    let window = TimeWindow {
        start: parse_timestamp(&cli.start).map_err(|e| format!("invalid start: {e}"))?,
        end: parse_timestamp(&cli.end).map_err(|e| format!("invalid end: {e}"))?,
    };

    let config = ExportConfig::new(cli.bucket, window)
        .with_dataset(cli.dataset)
        .with_step(step.as_secs())
        .with_prometheus(cli.host, cli.port)
        .with_workspace(cli.workspace)
        .with_staging_prefix(cli.staging_prefix)
        .with_project(cli.project);
    config.validate()?;

    tracing::info!(
        bucket = %config.bucket,
        dataset = %config.dataset,
        start = config.window.start,
        end = config.window.end,
        step = config.step,
        backend = %config.prometheus.query_url(),
        "starting export run"
    );

    tracing::info!("Loading metric definitions from: {}", cli.metrics);
    let metrics = MetricsConfig::load(&cli.metrics)?;
    tracing::info!("Found {} metric definitions", metrics.metrics.len());

    let client = PromClient::new(&config.prometheus);
    let staging = ObjectStoreStaging::gcs(&config.bucket)?;
    let warehouse = BigQueryWarehouse::connect(config.project.clone()).await?;

    let mut runner = ExportRunner::new(config, client, Box::new(staging), Box::new(warehouse));
    for spec in metrics.to_specs() {
        runner.add(spec);
    }
    runner.run().await?;

    tracing::info!("Export run complete");
    Ok(())
}
