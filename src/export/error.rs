//! Export pipeline error types.

use thiserror::Error;

use crate::config::ConfigError;
use crate::prometheus::QueryError;
use crate::sink::SinkError;

/// Errors that abort an export run.
///
/// There is no retry anywhere: a sample-time format violation or any
/// publish-time failure surfaces here and ends the run. Specs not yet
/// published are never reached; specs already published keep their
/// warehouse state.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Query transport failure or fatal response-format violation.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Buffer file or workspace I/O failure.
    #[error("workspace io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failure.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Frame columns of unequal length (extender hook misuse).
    #[error("column '{column}' has {actual} values, expected {expected}")]
    ColumnMismatch {
        /// Offending column name.
        column: String,
        /// Row count of the first column.
        expected: usize,
        /// Row count of the offending column.
        actual: usize,
    },

    /// Staging upload or warehouse load failure.
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// Invalid run configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
