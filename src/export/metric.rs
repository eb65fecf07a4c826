//! Metric specification: sampling and publishing one exported metric.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use tracing::{debug, error, info};

use crate::config::ExportConfig;
use crate::prometheus::{InstantSample, PromClient, QueryResult};
use crate::sink::{StagingStore, Warehouse, WriteDisposition};

use super::error::ExportError;
use super::frame::Frame;

/// Hook invoked with the raw result set and the in-progress frame, allowed
/// to add derived columns before rows are written. Added columns must match
/// the result set's length.
pub type ColumnExtender = Box<dyn Fn(&[InstantSample], &mut Frame) + Send + Sync>;

/// Qualified destination table identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableId {
    /// Destination dataset.
    pub dataset: String,
    /// Table name within the dataset.
    pub table: String,
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.dataset, self.table)
    }
}

/// What one `sample()` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    /// Rows written to the local buffer.
    Written(usize),

    /// Result set was empty; nothing written.
    Empty,

    /// Response body was not decodable; sample skipped.
    Skipped,
}

/// What one `publish()` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Buffer staged and loaded; destination table row count after the load.
    Loaded(u64),

    /// No buffer existed; nothing staged or loaded.
    NoData,
}

/// One exportable metric: query expression, column mapping, destination
/// table identity, and the info/time-series distinction.
///
/// Info tables (`is_info`) carry only labels and are fully overwritten on
/// every sample and every load; time-series tables additionally emit
/// `timestamp` and `value` columns and accumulate across the window walk.
pub struct MetricSpec {
    table: String,
    promql: String,
    columns: BTreeMap<String, String>,
    is_info: bool,
    extend: Option<ColumnExtender>,
}

impl fmt::Debug for MetricSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricSpec")
            .field("table", &self.table)
            .field("promql", &self.promql)
            .field("columns", &self.columns)
            .field("is_info", &self.is_info)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for MetricSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.table, self.promql)
    }
}

impl MetricSpec {
    /// Create a time-series spec for `table` sampling `promql`.
    pub fn new(table: impl Into<String>, promql: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            promql: promql.into(),
            columns: BTreeMap::new(),
            is_info: false,
            extend: None,
        }
    }

    /// Set the label-to-column rename map.
    pub fn with_columns(mut self, columns: BTreeMap<String, String>) -> Self {
        self.columns = columns;
        self
    }

    /// Add a single label-to-column rename.
    pub fn with_column(mut self, label: impl Into<String>, column: impl Into<String>) -> Self {
        self.columns.insert(label.into(), column.into());
        self
    }

    /// Mark this spec as an info table: full overwrite on every sample and
    /// every load, no `timestamp`/`value` columns.
    pub fn info(mut self) -> Self {
        self.is_info = true;
        self
    }

    /// Set the derived-column hook.
    pub fn with_extender(
        mut self,
        extend: impl Fn(&[InstantSample], &mut Frame) + Send + Sync + 'static,
    ) -> Self {
        self.extend = Some(Box::new(extend));
        self
    }

    /// Destination table name within the dataset.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The PromQL expression sampled at each time point.
    pub fn promql(&self) -> &str {
        &self.promql
    }

    /// True for info (full-refresh) tables.
    pub fn is_info(&self) -> bool {
        self.is_info
    }

    /// Qualified table identity under the configured dataset.
    pub fn table_id(&self, config: &ExportConfig) -> TableId {
        TableId {
            dataset: config.dataset.clone(),
            table: self.table.clone(),
        }
    }

    /// Local buffer path: `<workspace>/<dataset>.<table>.csv`.
    pub fn buffer_path(&self, config: &ExportConfig) -> PathBuf {
        config
            .workspace
            .join(format!("{}.csv", self.table_id(config)))
    }

    /// Staging blob key: `<prefix>/<dataset>.<table>.csv`.
    pub fn blob_key(&self, config: &ExportConfig) -> String {
        format!("{}/{}.csv", config.staging_prefix, self.table_id(config))
    }

    /// Query this metric at `time` and accumulate rows into the local buffer.
    ///
    /// A body that is not JSON is logged in full and skipped (the run
    /// continues); a JSON response without `data.result` is a fatal format
    /// violation. An empty result set writes nothing.
    ///
    /// # Errors
    /// Fails on transport errors, format violations, and buffer I/O.
    pub async fn sample(
        &self,
        client: &PromClient,
        config: &ExportConfig,
        time: i64,
    ) -> Result<SampleOutcome, ExportError> {
        let samples = match client.query(&self.promql, time).await? {
            QueryResult::Undecodable { error, body } => {
                error!(metric = %self, %error, %body, "response not decodable, sample skipped");
                return Ok(SampleOutcome::Skipped);
            }
            QueryResult::Samples(samples) => samples,
        };

        debug!(metric = %self, len = samples.len(), "query result");
        if samples.is_empty() {
            debug!(metric = %self, time, "no data, skipped");
            return Ok(SampleOutcome::Empty);
        }

        let frame = self.build_frame(&samples);
        let rows = frame.len();
        let path = self.buffer_path(config);

        // Info buffers keep only the most recent sample; time-series
        // buffers accumulate, writing the header once.
        if self.is_info || !path.exists() {
            frame.write_new(&path)?;
        } else {
            frame.append(&path)?;
        }

        Ok(SampleOutcome::Written(rows))
    }

    /// Stage the accumulated buffer and bulk-load it into the destination
    /// table, blocking until the load job completes.
    ///
    /// A spec whose buffer never materialized (every sample was empty or
    /// skipped) contributes nothing: no storage or warehouse calls.
    ///
    /// # Errors
    /// Staging upload and load-job failures propagate; there is no retry.
    pub async fn publish(
        &self,
        staging: &dyn StagingStore,
        warehouse: &dyn Warehouse,
        config: &ExportConfig,
    ) -> Result<PublishOutcome, ExportError> {
        let table_id = self.table_id(config);
        let path = self.buffer_path(config);

        if !path.exists() {
            info!(table = %table_id, "no records, skipped");
            return Ok(PublishOutcome::NoData);
        }

        let uri = staging.upload(&path, &self.blob_key(config)).await?;

        let disposition = if self.is_info {
            WriteDisposition::Truncate
        } else {
            WriteDisposition::Append
        };
        let rows = warehouse.load(&uri, &table_id, disposition).await?;

        info!(table = %table_id, rows, "load job finished");
        Ok(PublishOutcome::Loaded(rows))
    }

    /// Convert a non-empty result set into a frame.
    ///
    /// One column per label key of the first result, renamed through the
    /// column map; `timestamp` and `value` columns for time-series specs;
    /// extender hook last.
    fn build_frame(&self, samples: &[InstantSample]) -> Frame {
        let mut frame = Frame::new();

        if let Some(first) = samples.first() {
            for key in first.metric.keys() {
                let column = self
                    .columns
                    .get(key)
                    .cloned()
                    .unwrap_or_else(|| key.clone());
                let values = samples.iter().map(|s| s.metric.get(key).cloned()).collect();
                frame.push_column(column, values);
            }
        }

        if !self.is_info {
            frame.push_column(
                "timestamp",
                samples
                    .iter()
                    .map(|s| s.value.as_ref().map(|v| v.timestamp_field()))
                    .collect(),
            );
            frame.push_column(
                "value",
                samples
                    .iter()
                    .map(|s| s.value.as_ref().map(|v| v.value.clone()))
                    .collect(),
            );
        }

        if let Some(extend) = &self.extend {
            extend(samples, &mut frame);
        }

        frame
    }
}
