use crate::traits::{ObjectStorage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use clipyard_core::StorageConfig;
use futures::TryStreamExt;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectMeta, ObjectStore, ObjectStoreExt, PutPayload, Result as ObjectResult};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// S3-compatible storage implementation (MinIO, AWS S3, ...)
///
/// `object_store` binds a client to one bucket, so a client is built lazily for each
/// bucket a URL names and cached for the life of the process.
pub struct S3Storage {
    endpoint_url: String,
    region: String,
    access_key: String,
    secret_key: String,
    stores: RwLock<HashMap<String, Arc<AmazonS3>>>,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// The default bucket's client is built eagerly so that a malformed endpoint is
    /// reported at startup rather than on the first request.
    pub fn new(config: &StorageConfig) -> StorageResult<Self> {
        let storage = S3Storage {
            endpoint_url: config.endpoint.trim_end_matches('/').to_string(),
            region: config.region.clone(),
            access_key: config.access_key.clone(),
            secret_key: config.secret_key.clone(),
            stores: RwLock::new(HashMap::new()),
        };
        storage.store(&config.default_bucket)?;
        Ok(storage)
    }

    fn build_store(&self, bucket: &str) -> StorageResult<AmazonS3> {
        let allow_http = self.endpoint_url.starts_with("http://");
        AmazonS3Builder::new()
            .with_endpoint(self.endpoint_url.clone())
            .with_allow_http(allow_http)
            .with_region(self.region.clone())
            .with_access_key_id(self.access_key.clone())
            .with_secret_access_key(self.secret_key.clone())
            .with_bucket_name(bucket.to_string())
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))
    }

    fn store(&self, bucket: &str) -> StorageResult<Arc<AmazonS3>> {
        if bucket.is_empty() {
            return Err(StorageError::InvalidKey("Bucket name is empty".to_string()));
        }

        if let Some(store) = self
            .stores
            .read()
            .map_err(|_| StorageError::ConfigError("S3 client cache poisoned".to_string()))?
            .get(bucket)
        {
            return Ok(store.clone());
        }

        let store = Arc::new(self.build_store(bucket)?);
        let mut stores = self
            .stores
            .write()
            .map_err(|_| StorageError::ConfigError("S3 client cache poisoned".to_string()))?;
        Ok(stores
            .entry(bucket.to_string())
            .or_insert(store)
            .clone())
    }

    /// The key is sent exactly as given, without percent-encoding. Empty segments
    /// (`a//b`) are rejected.
    fn location(key: &str) -> StorageResult<Path> {
        if key.is_empty() || key.starts_with('/') {
            return Err(StorageError::InvalidKey(format!("'{}'", key)));
        }
        Path::parse(key).map_err(|e| StorageError::InvalidKey(format!("'{}': {}", key, e)))
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        let start = std::time::Instant::now();
        let store = self.store(bucket)?;
        let location = Self::location(key)?;

        let result: ObjectResult<_> = store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(format!("{}/{}", bucket, key)),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 download failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = bytes.len() as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download successful"
        );

        Ok(bytes.to_vec())
    }

    async fn put_object(&self, bucket: &str, key: &str, data: Vec<u8>) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let store = self.store(bucket)?;
        let location = Self::location(key)?;
        let size = data.len() as u64;

        let result: ObjectResult<_> = store
            .put(&location, PutPayload::from(Bytes::from(data)))
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    async fn copy_object(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> StorageResult<()> {
        let start = std::time::Instant::now();

        if src_bucket != dst_bucket {
            // object_store copies within one bucket only
            let data = self.get_object(src_bucket, src_key).await?;
            return self.put_object(dst_bucket, dst_key, data).await;
        }

        let store = self.store(src_bucket)?;
        let from = Self::location(src_key)?;
        let to = Self::location(dst_key)?;

        let copy_result: ObjectResult<_> = store.copy(&from, &to).await;

        copy_result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => {
                StorageError::NotFound(format!("{}/{}", src_bucket, src_key))
            }
            other => StorageError::CopyFailed(other.to_string()),
        })?;

        tracing::info!(
            bucket = %src_bucket,
            from_key = %src_key,
            to_key = %dst_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 copy successful"
        );

        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let store = self.store(bucket)?;
        let location = Self::location(key)?;

        let result: ObjectResult<_> = store.delete(&location).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %bucket,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 delete failed"
            );
            StorageError::DeleteFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn list_objects(&self, bucket: &str) -> StorageResult<Vec<String>> {
        let start = std::time::Instant::now();
        let store = self.store(bucket)?;

        let objects: Vec<ObjectMeta> = store
            .list(None)
            .try_collect()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %bucket,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 list failed"
                );
                StorageError::ListFailed(e.to_string())
            })?;

        tracing::debug!(
            bucket = %bucket,
            object_count = objects.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 list successful"
        );

        Ok(objects
            .into_iter()
            .map(|meta| meta.location.as_ref().to_string())
            .collect())
    }

    fn endpoint(&self) -> &str {
        &self.endpoint_url
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
