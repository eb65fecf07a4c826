//! Object-storage staging for buffer files.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use tracing::debug;

use super::error::SinkError;

/// The staging area a buffer file passes through before warehouse load.
#[async_trait]
pub trait StagingStore: Send + Sync {
    /// Upload the local file at `path` to `key`, returning the staged URI
    /// the warehouse will load from.
    async fn upload(&self, path: &Path, key: &str) -> Result<String, SinkError>;
}

/// Staging backed by an [`ObjectStore`] bucket.
pub struct ObjectStoreStaging {
    store: Arc<dyn ObjectStore>,
    uri_prefix: String,
}

impl ObjectStoreStaging {
    /// Staging over an arbitrary store. `uri_prefix` is prepended to blob
    /// keys to form staged URIs (e.g. `gs://my-bucket`).
    pub fn new(store: Arc<dyn ObjectStore>, uri_prefix: impl Into<String>) -> Self {
        Self {
            store,
            uri_prefix: uri_prefix.into(),
        }
    }

    /// GCS-backed staging for `bucket`. Credentials come from the ambient
    /// service-account environment.
    pub fn gcs(bucket: &str) -> Result<Self, SinkError> {
        let store = object_store::gcp::GoogleCloudStorageBuilder::new()
            .with_bucket_name(bucket)
            .build()?;
        Ok(Self::new(Arc::new(store), format!("gs://{bucket}")))
    }
}

#[async_trait]
impl StagingStore for ObjectStoreStaging {
    async fn upload(&self, path: &Path, key: &str) -> Result<String, SinkError> {
        let blob = ObjectPath::parse(key).map_err(|source| SinkError::Path {
            key: key.to_string(),
            source,
        })?;

        let bytes = tokio::fs::read(path).await?;
        self.store.put(&blob, PutPayload::from(bytes)).await?;

        let uri = format!("{}/{}", self.uri_prefix, key);
        debug!(%uri, "buffer staged");
        Ok(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    #[tokio::test]
    async fn test_upload_returns_uri_and_stores_bytes() {
        let store = Arc::new(InMemory::new());
        let staging = ObjectStoreStaging::new(store.clone(), "mem://bucket");

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("table.csv");
        std::fs::write(&file, "a,b\n1,2\n").unwrap();

        let uri = staging.upload(&file, "prefix/table.csv").await.unwrap();
        assert_eq!(uri, "mem://bucket/prefix/table.csv");

        let staged = store
            .get(&ObjectPath::from("prefix/table.csv"))
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap();
        assert_eq!(staged.as_ref(), b"a,b\n1,2\n");
    }

    #[tokio::test]
    async fn test_upload_missing_file_fails() {
        let staging = ObjectStoreStaging::new(Arc::new(InMemory::new()), "mem://bucket");
        let result = staging
            .upload(Path::new("/nonexistent/buffer.csv"), "prefix/buffer.csv")
            .await;
        assert!(matches!(result, Err(SinkError::Io(_))));
    }
}
