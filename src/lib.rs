//! Promsink - Prometheus to BigQuery Batch Exporter
//!
//! This crate walks a fixed historical time window at a fixed step, queries
//! a Prometheus-compatible backend at each time point for every configured
//! metric, flattens each result set into CSV rows accumulated in per-metric
//! local buffers, then stages each buffer to object storage and bulk-loads
//! it into its destination warehouse table. One run processes one window.
//!
//! # Architecture
//!
//! - **Config**: explicit [`ExportConfig`] passed to the runner, plus YAML
//!   metric definitions ([`MetricsConfig`])
//! - **Prometheus**: instant-query client and response decoding
//! - **Export**: the dump-and-load pipeline ([`MetricSpec`], [`ExportRunner`])
//! - **Sink**: staging ([`StagingStore`]) and warehouse ([`Warehouse`])
//!   boundaries with GCS and BigQuery implementations
//!
//! # Example
//!
//! ```rust,no_run
//! use promsink::{
//!     ExportConfig, ExportRunner, MetricSpec, ObjectStoreStaging, PromClient, TimeWindow,
//! };
//!
//! # async fn run(warehouse: Box<dyn promsink::Warehouse>) -> Result<(), promsink::ExportError> {
//! let config = ExportConfig::new("my-bucket", TimeWindow { start: 1000, end: 2000 })
//!     .with_step(60)
//!     .with_prometheus("prom.internal", 9090);
//! let client = PromClient::new(&config.prometheus);
//! let staging = ObjectStoreStaging::gcs(&config.bucket)?;
//!
//! let mut runner = ExportRunner::new(config, client, Box::new(staging), warehouse);
//! runner.add(MetricSpec::new("node_load", "node_load1").with_column("instance", "host"));
//! runner.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod export;
pub mod prometheus;
pub mod sink;

pub use config::{ConfigError, ExportConfig, MetricsConfig, PrometheusConfig, TimeWindow};
pub use export::{
    ColumnExtender, ExportError, ExportRunner, Frame, MetricSpec, PublishOutcome, SampleOutcome,
    TableId,
};
pub use prometheus::{InstantSample, PromClient, QueryError};
pub use sink::{
    BigQueryWarehouse, ObjectStoreStaging, SinkError, StagingStore, Warehouse, WriteDisposition,
};
