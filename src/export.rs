//! Export Pipeline
//!
//! The time-windowed dump-and-load core:
//!
//! - [`MetricSpec`]: one exportable metric; `sample()` accumulates query
//!   results into a local CSV buffer, `publish()` stages the buffer and
//!   bulk-loads it into the destination table
//! - [`Frame`]: column-major tabular assembly with an equal-length invariant
//! - [`ExportRunner`]: workspace lifecycle, window walk, publish phase
//!
//! Everything runs strictly sequentially: one metric at a time, one time
//! point at a time, staging before loading.

mod error;
mod frame;
mod metric;
mod runner;

pub use error::ExportError;
pub use frame::Frame;
pub use metric::{ColumnExtender, MetricSpec, PublishOutcome, SampleOutcome, TableId};
pub use runner::{ExportRunner, time_steps};
