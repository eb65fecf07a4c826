//! Run configuration structures.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::validation::ConfigError;

// =============================================================================
// Constants
// =============================================================================

/// Default destination dataset.
pub const DEFAULT_DATASET: &str = "test_prom";

/// Default Prometheus host.
pub const DEFAULT_PROM_HOST: &str = "localhost";

/// Default Prometheus port.
pub const DEFAULT_PROM_PORT: u16 = 30090;

/// Default local workspace directory for buffer files.
pub const DEFAULT_WORKSPACE: &str = "var";

/// Default staging key prefix inside the bucket.
pub const DEFAULT_STAGING_PREFIX: &str = "prom_upload";

/// Default sample step (seconds).
pub const DEFAULT_STEP_SECS: u64 = 60;

// =============================================================================
// Prometheus Backend Configuration
// =============================================================================

/// Prometheus query endpoint location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrometheusConfig {
    /// Backend host (default: "localhost").
    pub host: String,

    /// Backend port (default: 30090).
    pub port: u16,
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_PROM_HOST.to_string(),
            port: DEFAULT_PROM_PORT,
        }
    }
}

impl PrometheusConfig {
    /// Create a configuration for a specific host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Full URL of the instant-query endpoint.
    pub fn query_url(&self) -> String {
        format!("http://{}:{}/api/v1/query", self.host, self.port)
    }
}

// =============================================================================
// Time Window
// =============================================================================

/// Half-open export window in Unix seconds: `start <= t < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Inclusive window start.
    pub start: i64,

    /// Exclusive window end.
    pub end: i64,
}

// =============================================================================
// Export Configuration
// =============================================================================

/// Top-level run configuration, passed to the runner at construction.
///
/// Immutable for the duration of a run. Built in `main` from CLI arguments
/// and environment variables; tests construct it directly.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Target bucket for staged buffer files.
    pub bucket: String,

    /// Destination dataset name.
    pub dataset: String,

    /// Time window walked by the runner.
    pub window: TimeWindow,

    /// Sample step in seconds.
    pub step: u64,

    /// Prometheus backend location.
    pub prometheus: PrometheusConfig,

    /// Local workspace directory holding per-metric buffer files.
    pub workspace: PathBuf,

    /// Key prefix for staged objects inside the bucket.
    pub staging_prefix: String,

    /// GCP project for warehouse load jobs. Resolved from the ambient
    /// credentials when absent.
    pub project: Option<String>,
}

impl ExportConfig {
    /// Create a configuration with defaults for everything but the bucket
    /// and window.
    pub fn new(bucket: impl Into<String>, window: TimeWindow) -> Self {
        Self {
            bucket: bucket.into(),
            dataset: DEFAULT_DATASET.to_string(),
            window,
            step: DEFAULT_STEP_SECS,
            prometheus: PrometheusConfig::default(),
            workspace: PathBuf::from(DEFAULT_WORKSPACE),
            staging_prefix: DEFAULT_STAGING_PREFIX.to_string(),
            project: None,
        }
    }

    /// Set the destination dataset.
    pub fn with_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = dataset.into();
        self
    }

    /// Set the sample step in seconds.
    pub fn with_step(mut self, step: u64) -> Self {
        self.step = step;
        self
    }

    /// Set the Prometheus backend location.
    pub fn with_prometheus(mut self, host: impl Into<String>, port: u16) -> Self {
        self.prometheus = PrometheusConfig::new(host, port);
        self
    }

    /// Set the local workspace directory.
    pub fn with_workspace(mut self, workspace: impl Into<PathBuf>) -> Self {
        self.workspace = workspace.into();
        self
    }

    /// Set the staging key prefix.
    pub fn with_staging_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.staging_prefix = prefix.into();
        self
    }

    /// Set the GCP project for load jobs.
    pub fn with_project(mut self, project: Option<String>) -> Self {
        self.project = project;
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket.is_empty() {
            return Err(ConfigError::ValidationError(
                "bucket cannot be empty".to_string(),
            ));
        }

        if self.dataset.is_empty() {
            return Err(ConfigError::ValidationError(
                "dataset cannot be empty".to_string(),
            ));
        }

        if self.step == 0 {
            return Err(ConfigError::ValidationError(
                "step must be positive".to_string(),
            ));
        }

        if self.window.start >= self.window.end {
            return Err(ConfigError::ValidationError(format!(
                "window start ({}) must be before end ({})",
                self.window.start, self.window.end
            )));
        }

        if self.workspace.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "workspace cannot be empty".to_string(),
            ));
        }

        if self.staging_prefix.is_empty() || self.staging_prefix.contains('/') {
            return Err(ConfigError::ValidationError(format!(
                "staging prefix must be a single non-empty path segment, got '{}'",
                self.staging_prefix
            )));
        }

        Ok(())
    }
}
