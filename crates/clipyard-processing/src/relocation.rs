//! Relocation engine: files objects into an execution folder.
//!
//! A move is a copy followed by a delete; it is not atomic. When the copy succeeds
//! and the delete fails the object exists at both keys and the copy is left in place.

use clipyard_core::{parse_object_url, ObjectRef};
use clipyard_storage::{ObjectStorage, StorageError};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelocationError {
    #[error("copy to '{dest_key}' failed: {source}")]
    Copy {
        dest_key: String,
        #[source]
        source: StorageError,
    },

    #[error("delete of '{source_key}' failed after copy: {source}")]
    Delete {
        source_key: String,
        #[source]
        source: StorageError,
    },

    #[error("key '{0}' has no file name")]
    NoFileName(String),
}

/// An input URL that could not be relocated, with the reason.
#[derive(Debug)]
pub struct RelocationFailure {
    pub original_url: String,
    pub error: RelocationError,
}

pub struct RelocationEngine {
    storage: Arc<dyn ObjectStorage>,
    default_bucket: String,
}

impl RelocationEngine {
    pub fn new(storage: Arc<dyn ObjectStorage>, default_bucket: impl Into<String>) -> Self {
        Self {
            storage,
            default_bucket: default_bucket.into(),
        }
    }

    /// Copy `source_key` to `dest_key` within `bucket`, then delete the source.
    pub async fn try_move_object(
        &self,
        bucket: &str,
        source_key: &str,
        dest_key: &str,
    ) -> Result<(), RelocationError> {
        if source_key == dest_key {
            return Ok(());
        }

        self.storage
            .copy_object(bucket, source_key, bucket, dest_key)
            .await
            .map_err(|source| RelocationError::Copy {
                dest_key: dest_key.to_string(),
                source,
            })?;
        tracing::info!(bucket = %bucket, from = %source_key, to = %dest_key, "Copied object");

        self.storage
            .delete_object(bucket, source_key)
            .await
            .map_err(|source| RelocationError::Delete {
                source_key: source_key.to_string(),
                source,
            })?;
        tracing::info!(bucket = %bucket, key = %source_key, "Deleted original");

        Ok(())
    }

    /// Move an object, reporting any failure as `false`.
    ///
    /// A failed delete after a successful copy also returns `false`; the copy is kept.
    pub async fn move_object(&self, bucket: &str, source_key: &str, dest_key: &str) -> bool {
        match self.try_move_object(bucket, source_key, dest_key).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %bucket,
                    key = %source_key,
                    "Failed to move object"
                );
                false
            }
        }
    }

    /// Relocate one URL into `execution_folder`, returning the URL to report for it.
    ///
    /// Objects already under the folder are returned unchanged.
    pub async fn relocate(
        &self,
        execution_folder: &str,
        url: &str,
    ) -> Result<String, RelocationFailure> {
        let object = parse_object_url(url, &self.default_bucket);

        if object.is_in_folder(execution_folder) {
            tracing::info!(key = %object.key, "File already in folder");
            return Ok(url.to_string());
        }

        let fail = |error| RelocationFailure {
            original_url: url.to_string(),
            error,
        };

        let dest = destination(&object, execution_folder)
            .ok_or_else(|| fail(RelocationError::NoFileName(object.key.clone())))?;

        self.try_move_object(&object.bucket, &object.key, &dest.key)
            .await
            .map_err(fail)?;

        let new_url = self.storage.object_url(&dest.bucket, &dest.key);
        tracing::info!(from = %url, to = %new_url, "Organized");
        Ok(new_url)
    }

    /// Relocate every URL in order. The result has one entry per input.
    pub async fn relocate_all(
        &self,
        execution_folder: &str,
        urls: &[String],
    ) -> Vec<Result<String, RelocationFailure>> {
        let mut results = Vec::with_capacity(urls.len());
        for url in urls {
            results.push(self.relocate(execution_folder, url).await);
        }
        results
    }

    /// Organize the given URLs into `execution_folder`.
    ///
    /// Output is order- and length-preserving: each failed item is reported with its
    /// original URL and never aborts the batch.
    pub async fn organize_list(&self, execution_folder: &str, urls: &[String]) -> Vec<String> {
        self.relocate_all(execution_folder, urls)
            .await
            .into_iter()
            .map(|result| {
                result.unwrap_or_else(|failure| {
                    tracing::error!(
                        error = %failure.error,
                        url = %failure.original_url,
                        "Error processing URL, keeping original"
                    );
                    failure.original_url
                })
            })
            .collect()
    }

    /// Move every object at the root of `bucket` into `execution_folder`.
    ///
    /// Only successfully moved objects are reported; failures are logged and dropped.
    /// A listing failure yields an empty result.
    pub async fn organize_all_root_objects(
        &self,
        execution_folder: &str,
        bucket: Option<&str>,
    ) -> Vec<String> {
        let bucket = bucket.unwrap_or(&self.default_bucket);

        let keys = match self.storage.list_objects(bucket).await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::error!(error = %e, bucket = %bucket, "Error listing bucket");
                return Vec::new();
            }
        };

        if keys.is_empty() {
            tracing::info!(bucket = %bucket, "No files found in bucket");
        }

        let folder_marker = format!("{}/", execution_folder);
        let mut new_urls = Vec::new();

        for key in keys {
            if key.contains('/') || key == execution_folder || key == folder_marker {
                continue;
            }

            let object = ObjectRef::new(bucket, key);
            let Some(dest) = destination(&object, execution_folder) else {
                continue;
            };

            if self.move_object(bucket, &object.key, &dest.key).await {
                let new_url = self.storage.object_url(&dest.bucket, &dest.key);
                tracing::info!(from = %object.key, to = %dest.key, "Organized");
                new_urls.push(new_url);
            }
        }

        new_urls
    }
}

/// `execution_folder/<file name>` in the object's bucket.
fn destination(object: &ObjectRef, execution_folder: &str) -> Option<ObjectRef> {
    let file_name = object.file_name();
    if file_name.is_empty() {
        return None;
    }
    Some(ObjectRef::new(
        object.bucket.clone(),
        format!("{}/{}", execution_folder, file_name),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clipyard_storage::{LocalStorage, StorageBackend, StorageResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;

    const ENDPOINT: &str = "http://minio:9000";
    const BUCKET: &str = "nca-toolkit";

    async fn local_storage() -> (TempDir, Arc<LocalStorage>) {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), ENDPOINT).await.unwrap();
        (dir, Arc::new(storage))
    }

    async fn seed(storage: &LocalStorage, keys: &[&str]) {
        for key in keys {
            storage
                .put_object(BUCKET, key, key.as_bytes().to_vec())
                .await
                .unwrap();
        }
    }

    fn url(key: &str) -> String {
        format!("{}/{}/{}", ENDPOINT, BUCKET, key)
    }

    /// Wraps a real backend and fails selected operations.
    struct FaultyStorage {
        inner: Arc<LocalStorage>,
        fail_copy_for: Option<String>,
        fail_delete: bool,
        list_fails: bool,
        listed_keys: Option<Vec<String>>,
        copied: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl FaultyStorage {
        fn new(inner: Arc<LocalStorage>) -> Self {
            Self {
                inner,
                fail_copy_for: None,
                fail_delete: false,
                list_fails: false,
                listed_keys: None,
                copied: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ObjectStorage for FaultyStorage {
        async fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.get_object(bucket, key).await
        }

        async fn put_object(&self, bucket: &str, key: &str, data: Vec<u8>) -> StorageResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.put_object(bucket, key, data).await
        }

        async fn copy_object(
            &self,
            src_bucket: &str,
            src_key: &str,
            dst_bucket: &str,
            dst_key: &str,
        ) -> StorageResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.copied.lock().unwrap().push(src_key.to_string());
            if self.fail_copy_for.as_deref() == Some(src_key) {
                return Err(StorageError::CopyFailed("injected copy failure".to_string()));
            }
            self.inner
                .copy_object(src_bucket, src_key, dst_bucket, dst_key)
                .await
        }

        async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_delete {
                return Err(StorageError::DeleteFailed("injected delete failure".to_string()));
            }
            self.inner.delete_object(bucket, key).await
        }

        async fn list_objects(&self, bucket: &str) -> StorageResult<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.list_fails {
                return Err(StorageError::ListFailed("injected list failure".to_string()));
            }
            if let Some(keys) = &self.listed_keys {
                return Ok(keys.clone());
            }
            self.inner.list_objects(bucket).await
        }

        fn endpoint(&self) -> &str {
            self.inner.endpoint()
        }

        fn backend_type(&self) -> StorageBackend {
            self.inner.backend_type()
        }
    }

    #[tokio::test]
    async fn test_organize_list_moves_files_into_folder() {
        let (_dir, storage) = local_storage().await;
        seed(&storage, &["file1.mp4", "file2.mp3"]).await;
        let engine = RelocationEngine::new(storage.clone(), BUCKET);

        let urls = vec![url("file1.mp4"), url("file2.mp3")];
        let organized = engine.organize_list("execution_1", &urls).await;

        assert_eq!(
            organized,
            vec![url("execution_1/file1.mp4"), url("execution_1/file2.mp3")]
        );
        let keys = storage.list_objects(BUCKET).await.unwrap();
        assert_eq!(keys, vec!["execution_1/file1.mp4", "execution_1/file2.mp3"]);
    }

    #[tokio::test]
    async fn test_organize_list_uses_basename_of_nested_keys() {
        let (_dir, storage) = local_storage().await;
        seed(&storage, &["other_run/clip.mp4"]).await;
        let engine = RelocationEngine::new(storage.clone(), BUCKET);

        let organized = engine
            .organize_list("execution_2", &[url("other_run/clip.mp4")])
            .await;

        assert_eq!(organized, vec![url("execution_2/clip.mp4")]);
        assert_eq!(
            storage.get_object(BUCKET, "execution_2/clip.mp4").await.unwrap(),
            b"other_run/clip.mp4".to_vec()
        );
    }

    #[tokio::test]
    async fn test_organize_list_is_idempotent() {
        let (_dir, storage) = local_storage().await;
        seed(&storage, &["exec/a.mp4", "exec/b.mp4"]).await;
        let faulty = Arc::new(FaultyStorage::new(storage.clone()));
        let engine = RelocationEngine::new(faulty.clone(), BUCKET);

        let urls = vec![url("exec/a.mp4"), url("exec/b.mp4")];
        let first = engine.organize_list("exec", &urls).await;
        let second = engine.organize_list("exec", &first).await;

        assert_eq!(first, urls);
        assert_eq!(second, urls);
        assert_eq!(faulty.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_organize_list_preserves_order_and_length_on_failures() {
        let (_dir, storage) = local_storage().await;
        seed(&storage, &["ok1.mp4", "bad.mp4", "ok2.mp4"]).await;
        let mut faulty = FaultyStorage::new(storage.clone());
        faulty.fail_copy_for = Some("bad.mp4".to_string());
        let engine = RelocationEngine::new(Arc::new(faulty), BUCKET);

        let urls = vec![
            url("ok1.mp4"),
            url("bad.mp4"),
            url("missing.mp4"),
            url("folder/"),
            url("exec/already.mp4"),
            url("ok2.mp4"),
        ];
        let organized = engine.organize_list("exec", &urls).await;

        assert_eq!(organized.len(), urls.len());
        assert_eq!(
            organized,
            vec![
                url("exec/ok1.mp4"),
                url("bad.mp4"),
                url("missing.mp4"),
                url("folder/"),
                url("exec/already.mp4"),
                url("exec/ok2.mp4"),
            ]
        );
    }

    #[tokio::test]
    async fn test_relocate_all_reports_failure_reasons() {
        let (_dir, storage) = local_storage().await;
        let engine = RelocationEngine::new(storage, BUCKET);

        let results = engine
            .relocate_all("exec", &[url("missing.mp4"), url("dir/")])
            .await;

        match &results[0] {
            Err(RelocationFailure {
                original_url,
                error: RelocationError::Copy { source, .. },
            }) => {
                assert_eq!(original_url, &url("missing.mp4"));
                assert!(matches!(source, StorageError::NotFound(_)));
            }
            other => panic!("expected copy failure, got {:?}", other),
        }
        assert!(matches!(
            &results[1],
            Err(RelocationFailure {
                error: RelocationError::NoFileName(_),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_single_segment_url_uses_default_bucket() {
        let (_dir, storage) = local_storage().await;
        seed(&storage, &["loose.mp4"]).await;
        let engine = RelocationEngine::new(storage.clone(), BUCKET);

        let organized = engine
            .organize_list("exec", &[format!("{}/loose.mp4", ENDPOINT)])
            .await;

        assert_eq!(organized, vec![url("exec/loose.mp4")]);
    }

    #[tokio::test]
    async fn test_move_object_delete_failure_leaves_both_copies() {
        let (_dir, storage) = local_storage().await;
        seed(&storage, &["clip.mp4"]).await;
        let mut faulty = FaultyStorage::new(storage.clone());
        faulty.fail_delete = true;
        let engine = RelocationEngine::new(Arc::new(faulty), BUCKET);

        let moved = engine.move_object(BUCKET, "clip.mp4", "exec/clip.mp4").await;

        assert!(!moved);
        assert!(storage.get_object(BUCKET, "clip.mp4").await.is_ok());
        assert!(storage.get_object(BUCKET, "exec/clip.mp4").await.is_ok());

        // organize_list falls back to the original URL in that state
        let organized = engine.organize_list("exec2", &[url("clip.mp4")]).await;
        assert_eq!(organized, vec![url("clip.mp4")]);
    }

    #[tokio::test]
    async fn test_move_object_copy_failure_leaves_source() {
        let (_dir, storage) = local_storage().await;
        seed(&storage, &["clip.mp4"]).await;
        let mut faulty = FaultyStorage::new(storage.clone());
        faulty.fail_copy_for = Some("clip.mp4".to_string());
        let engine = RelocationEngine::new(Arc::new(faulty), BUCKET);

        assert!(!engine.move_object(BUCKET, "clip.mp4", "exec/clip.mp4").await);
        assert!(storage.get_object(BUCKET, "clip.mp4").await.is_ok());
        assert!(storage.get_object(BUCKET, "exec/clip.mp4").await.is_err());
    }

    #[tokio::test]
    async fn test_organize_all_root_objects() {
        let (_dir, storage) = local_storage().await;
        seed(
            &storage,
            &["a.mp4", "b.mp3", "c.txt", "older/keep.mp4", "exec/existing.mp4"],
        )
        .await;
        let engine = RelocationEngine::new(storage.clone(), BUCKET);

        let mut moved = engine.organize_all_root_objects("exec", None).await;
        moved.sort();

        assert_eq!(
            moved,
            vec![url("exec/a.mp4"), url("exec/b.mp3"), url("exec/c.txt")]
        );

        let keys = storage.list_objects(BUCKET).await.unwrap();
        assert!(keys.iter().all(|k| k.contains('/')));
        let in_folder = keys.iter().filter(|k| k.starts_with("exec/")).count();
        assert_eq!(in_folder, 4);
        assert!(keys.contains(&"older/keep.mp4".to_string()));
    }

    #[tokio::test]
    async fn test_organize_all_root_objects_drops_failures() {
        let (_dir, storage) = local_storage().await;
        seed(&storage, &["a.mp4", "bad.mp4"]).await;
        let mut faulty = FaultyStorage::new(storage.clone());
        faulty.fail_copy_for = Some("bad.mp4".to_string());
        let engine = RelocationEngine::new(Arc::new(faulty), BUCKET);

        let moved = engine.organize_all_root_objects("exec", Some(BUCKET)).await;

        assert_eq!(moved, vec![url("exec/a.mp4")]);
        assert!(storage.get_object(BUCKET, "bad.mp4").await.is_ok());
    }

    #[tokio::test]
    async fn test_organize_all_root_objects_list_failure_is_empty() {
        let (_dir, storage) = local_storage().await;
        seed(&storage, &["a.mp4"]).await;
        let mut faulty = FaultyStorage::new(storage.clone());
        faulty.list_fails = true;
        let engine = RelocationEngine::new(Arc::new(faulty), BUCKET);

        assert!(engine.organize_all_root_objects("exec", None).await.is_empty());
        assert!(storage.get_object(BUCKET, "a.mp4").await.is_ok());
    }

    #[tokio::test]
    async fn test_organize_all_root_objects_skips_folder_key() {
        let (_dir, storage) = local_storage().await;
        seed(&storage, &["a.mp4"]).await;
        let mut faulty = FaultyStorage::new(storage.clone());
        faulty.listed_keys = Some(vec![
            "exec".to_string(),
            "exec/".to_string(),
            "a.mp4".to_string(),
        ]);
        let faulty = Arc::new(faulty);
        let engine = RelocationEngine::new(faulty.clone(), BUCKET);

        let organized = engine.organize_all_root_objects("exec", None).await;

        assert_eq!(organized, vec![url("exec/a.mp4")]);
        assert_eq!(*faulty.copied.lock().unwrap(), vec!["a.mp4".to_string()]);
        assert!(storage.get_object(BUCKET, "exec/a.mp4").await.is_ok());
    }
}
