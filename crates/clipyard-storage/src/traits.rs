//! Storage abstraction trait
//!
//! This module defines the ObjectStorage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use clipyard_core::format_object_url;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Copy failed: {0}")]
    CopyFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("List failed: {0}")]
    ListFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Object storage abstraction
///
/// A flat blob store addressed by `(bucket, key)`. Transfers are whole-object.
/// Components receive an `Arc<dyn ObjectStorage>` so tests can substitute their own.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Download an object's bytes
    async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>>;

    /// Create or overwrite an object
    async fn put_object(&self, bucket: &str, key: &str, data: Vec<u8>) -> StorageResult<()>;

    /// Server-side copy of an object to a new location
    async fn copy_object(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
    ) -> StorageResult<()>;

    /// Delete an object
    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()>;

    /// List every key in a bucket, in backend order
    async fn list_objects(&self, bucket: &str) -> StorageResult<Vec<String>>;

    /// Base URL used when reporting object locations
    fn endpoint(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;

    /// Public URL of an object: `{endpoint}/{bucket}/{key}`
    fn object_url(&self, bucket: &str, key: &str) -> String {
        format_object_url(self.endpoint(), bucket, key)
    }
}
