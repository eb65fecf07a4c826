//! Sink-specific error types.
//!
//! Every sink failure is fatal to a run: there is no retry and no partial
//! success handling. Re-running the whole job is the recovery mechanism.

use thiserror::Error;

/// Errors that can occur while staging or loading a buffer.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Object store operation failed.
    #[error("object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    /// Blob key did not parse as an object path.
    #[error("invalid blob key '{key}': {source}")]
    Path {
        /// The rejected key.
        key: String,
        #[source]
        source: object_store::path::Error,
    },

    /// Reading the local buffer failed.
    #[error("staging io error: {0}")]
    Io(#[from] std::io::Error),

    /// Warehouse API call failed.
    #[error("warehouse http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Credential acquisition failed.
    #[error("auth error: {0}")]
    Auth(#[from] gcp_auth::Error),

    /// Load job completed with an error result.
    #[error("load job failed: {0}")]
    Job(String),
}
