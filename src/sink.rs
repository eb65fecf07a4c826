//! Staging and Warehouse Sinks
//!
//! The two external services a publish passes through, specified at their
//! interface boundary:
//!
//! - [`StagingStore`]: object-storage staging for buffer files, backed by
//!   any [`object_store::ObjectStore`] (GCS in production, in-memory in tests)
//! - [`Warehouse`]: schema-inferring bulk table load with truncate-or-append
//!   semantics, implemented against the BigQuery Jobs REST API

mod error;
mod staging;
mod warehouse;

pub use error::SinkError;
pub use staging::{ObjectStoreStaging, StagingStore};
pub use warehouse::{BigQueryWarehouse, Warehouse, WriteDisposition};
