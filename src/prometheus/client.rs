//! Instant-query client.

use reqwest::Client;

use crate::config::PrometheusConfig;

use super::types::{QueryError, QueryResult, parse_query_response};

/// Client for the Prometheus instant-query endpoint.
///
/// The underlying [`reqwest::Client`] is built once and reused across the
/// whole window walk. No request timeout is configured: every call blocks
/// until the backend answers or the connection fails.
#[derive(Debug, Clone)]
pub struct PromClient {
    client: Client,
    query_url: String,
}

impl PromClient {
    /// Create a client for the configured backend.
    pub fn new(config: &PrometheusConfig) -> Self {
        Self {
            client: Client::new(),
            query_url: config.query_url(),
        }
    }

    /// Evaluate `promql` at `time`, returning the raw response body.
    pub async fn query_raw(&self, promql: &str, time: i64) -> Result<String, QueryError> {
        let time = time.to_string();
        let response = self
            .client
            .get(&self.query_url)
            .query(&[("query", promql), ("time", time.as_str())])
            .send()
            .await?;
        Ok(response.text().await?)
    }

    /// Evaluate `promql` at `time` and decode the result set.
    pub async fn query(&self, promql: &str, time: i64) -> Result<QueryResult, QueryError> {
        let body = self.query_raw(promql, time).await?;
        parse_query_response(&body)
    }
}
