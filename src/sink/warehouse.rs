//! Warehouse bulk loading.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::export::TableId;

use super::error::SinkError;

/// Interval between load-job status polls.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// BigQuery OAuth scope for load jobs and table metadata.
const BIGQUERY_SCOPE: &str = "https://www.googleapis.com/auth/bigquery";

/// BigQuery REST API root.
const DEFAULT_BASE_URL: &str = "https://bigquery.googleapis.com/bigquery/v2";

/// How a load writes into the destination table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteDisposition {
    /// Replace the table's contents (info tables).
    Truncate,

    /// Append to the table (time-series tables).
    Append,
}

impl WriteDisposition {
    /// Wire value for the load job configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Truncate => "WRITE_TRUNCATE",
            Self::Append => "WRITE_APPEND",
        }
    }
}

/// Schema-inferring bulk loader for the destination warehouse.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Load the staged object at `uri` into `table`, blocking until the job
    /// completes. Returns the destination table's row count after the load.
    async fn load(
        &self,
        uri: &str,
        table: &TableId,
        disposition: WriteDisposition,
    ) -> Result<u64, SinkError>;
}

/// BigQuery implementation over the Jobs REST API.
///
/// A load is one job insert followed by a blocking poll until the job state
/// reaches `DONE`, then one `tables.get` for the row count log line.
pub struct BigQueryWarehouse {
    client: reqwest::Client,
    token_provider: Arc<dyn gcp_auth::TokenProvider>,
    project: String,
    base_url: String,
}

impl BigQueryWarehouse {
    /// Connect using ambient credentials. `project` falls back to the
    /// credential's default project when `None`.
    pub async fn connect(project: Option<String>) -> Result<Self, SinkError> {
        let token_provider = gcp_auth::provider().await?;
        let project = match project {
            Some(project) => project,
            None => token_provider.project_id().await?.to_string(),
        };

        Ok(Self {
            client: reqwest::Client::new(),
            token_provider,
            project,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    async fn token(&self) -> Result<String, SinkError> {
        let token = self.token_provider.token(&[BIGQUERY_SCOPE]).await?;
        Ok(token.as_str().to_string())
    }

    async fn job_status(&self, job_id: &str) -> Result<JobResponse, SinkError> {
        let token = self.token().await?;
        let job = self
            .client
            .get(format!(
                "{}/projects/{}/jobs/{}",
                self.base_url, self.project, job_id
            ))
            .bearer_auth(&token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(job)
    }

    async fn table_rows(&self, table: &TableId) -> Result<u64, SinkError> {
        let token = self.token().await?;
        let meta: TableResponse = self
            .client
            .get(format!(
                "{}/projects/{}/datasets/{}/tables/{}",
                self.base_url, self.project, table.dataset, table.table
            ))
            .bearer_auth(&token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(meta
            .num_rows
            .and_then(|rows| rows.parse().ok())
            .unwrap_or(0))
    }
}

#[async_trait]
impl Warehouse for BigQueryWarehouse {
    async fn load(
        &self,
        uri: &str,
        table: &TableId,
        disposition: WriteDisposition,
    ) -> Result<u64, SinkError> {
        let body = json!({
            "configuration": {
                "load": {
                    "sourceUris": [uri],
                    "destinationTable": {
                        "projectId": self.project,
                        "datasetId": table.dataset,
                        "tableId": table.table,
                    },
                    "sourceFormat": "CSV",
                    "autodetect": true,
                    "writeDisposition": disposition.as_str(),
                }
            }
        });

        let token = self.token().await?;
        let job: JobResponse = self
            .client
            .post(format!("{}/projects/{}/jobs", self.base_url, self.project))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut job = job;
        let job_id = job.job_reference.job_id.clone();
        debug!(%job_id, table = %table, "load job submitted");

        // Synchronous wait for completion; no cancellation path.
        loop {
            if let Some(status) = &job.status {
                if status.state == "DONE" {
                    if let Some(error) = &status.error_result {
                        return Err(SinkError::Job(error.message.clone()));
                    }
                    break;
                }
            }
            tokio::time::sleep(POLL_INTERVAL).await;
            job = self.job_status(&job_id).await?;
        }

        self.table_rows(table).await
    }
}

#[derive(Debug, Deserialize)]
struct JobResponse {
    #[serde(rename = "jobReference")]
    job_reference: JobReference,
    #[serde(default)]
    status: Option<JobStatus>,
}

#[derive(Debug, Deserialize)]
struct JobReference {
    #[serde(rename = "jobId")]
    job_id: String,
}

#[derive(Debug, Deserialize)]
struct JobStatus {
    state: String,
    #[serde(rename = "errorResult")]
    error_result: Option<ErrorResult>,
}

#[derive(Debug, Deserialize)]
struct ErrorResult {
    message: String,
}

#[derive(Debug, Deserialize)]
struct TableResponse {
    #[serde(rename = "numRows", default)]
    num_rows: Option<String>,
}
