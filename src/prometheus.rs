//! Prometheus Query Backend
//!
//! Thin client for the Prometheus HTTP API (`/api/v1/query`) plus response
//! decoding with the error taxonomy the export pipeline depends on:
//!
//! - [`QueryResult::Undecodable`]: body is not JSON (non-fatal, sample skipped)
//! - [`QueryError::Format`]: JSON without `data.result` (fatal)
//! - [`QueryResult::Samples`]: decoded result set, possibly empty

mod client;
mod types;

pub use client::PromClient;
pub use types::{InstantSample, QueryError, QueryResult, ValuePair, parse_query_response};
