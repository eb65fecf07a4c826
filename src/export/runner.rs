//! Export runner: workspace lifecycle and window walk.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::ExportConfig;
use crate::prometheus::PromClient;
use crate::sink::{StagingStore, Warehouse};

use super::error::ExportError;
use super::metric::MetricSpec;

/// Yield the sample times of `[start, end)` stepping by `step` seconds.
///
/// Produces exactly `ceil((end - start) / step)` time points, every one of
/// them inside the window. A zero step yields no time points.
pub fn time_steps(start: i64, end: i64, step: u64) -> impl Iterator<Item = i64> {
    let end = if step == 0 { start } else { end };
    (start..end).step_by(step.max(1) as usize)
}

/// Walks the configured window, sampling every registered metric at each
/// time point, then publishes every metric's accumulated buffer.
///
/// Execution is fully sequential: metrics in registration order, time points
/// in ascending order, staging before loading. There is no checkpointing;
/// on a fatal error the run aborts where it stands.
///
/// Concurrent runs against the same destination tables are unsafe (the
/// workspace and the warehouse see no locking). Re-running an overlapping
/// window appends duplicate rows to time-series tables; avoiding overlap is
/// the caller's responsibility.
pub struct ExportRunner {
    config: ExportConfig,
    client: PromClient,
    staging: Box<dyn StagingStore>,
    warehouse: Box<dyn Warehouse>,
    specs: Vec<MetricSpec>,
}

impl ExportRunner {
    /// Create a runner. The configuration is validated when `run()` starts.
    pub fn new(
        config: ExportConfig,
        client: PromClient,
        staging: Box<dyn StagingStore>,
        warehouse: Box<dyn Warehouse>,
    ) -> Self {
        Self {
            config,
            client,
            staging,
            warehouse,
            specs: Vec::new(),
        }
    }

    /// Register a metric. Specs are sampled and published in registration
    /// order.
    pub fn add(&mut self, spec: MetricSpec) -> &mut Self {
        self.specs.push(spec);
        self
    }

    /// The run configuration.
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Execute one batch run: reset the workspace, walk the window, publish.
    ///
    /// # Errors
    /// The first fatal error aborts the run. Metrics already published keep
    /// their warehouse state; later metrics are never reached.
    pub async fn run(&self) -> Result<(), ExportError> {
        self.config.validate()?;
        self.reset_workspace()?;

        let window = self.config.window;
        for time in time_steps(window.start, window.end, self.config.step) {
            info!(time, wall = %format_time(time), "sampling");
            for spec in &self.specs {
                spec.sample(&self.client, &self.config, time).await?;
            }
        }

        for spec in &self.specs {
            spec.publish(self.staging.as_ref(), self.warehouse.as_ref(), &self.config)
                .await?;
        }

        Ok(())
    }

    /// Delete and recreate the workspace directory, wiping any leftover
    /// buffers from a prior run.
    fn reset_workspace(&self) -> Result<(), ExportError> {
        let workspace = &self.config.workspace;
        if workspace.exists() {
            std::fs::remove_dir_all(workspace)?;
        }
        std::fs::create_dir_all(workspace)?;
        Ok(())
    }
}

/// Wall-clock rendering of a Unix timestamp for the walk log.
fn format_time(time: i64) -> String {
    DateTime::<Utc>::from_timestamp(time, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| time.to_string())
}
