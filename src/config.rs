//! Configuration module for the exporter.
//!
//! Provides the explicit run configuration passed to the runner at
//! construction, plus YAML-based metric definition loading:
//! - Export settings (bucket, dataset, time window, step, backend location)
//! - Metric definitions (`metrics:` list with table, promql, column renames)

mod app;
mod metrics;
mod validation;

pub use app::{ExportConfig, PrometheusConfig, TimeWindow};
pub use metrics::{MetricDef, MetricsConfig};
pub use validation::{ConfigError, parse_duration, parse_timestamp};

// Re-export constants
pub use app::{DEFAULT_DATASET, DEFAULT_STAGING_PREFIX, DEFAULT_STEP_SECS, DEFAULT_WORKSPACE};
