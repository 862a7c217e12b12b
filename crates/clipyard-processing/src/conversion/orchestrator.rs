//! Conversion orchestrator - download, convert, upload
//!
//! Each request gets its own temporary directory holding `input.mp4` and
//! `output.mp4`. The directory is removed when the request finishes, whichever
//! stage it ends in.

use super::converter::{ConverterError, ExternalConverter};
use clipyard_core::{parse_object_url, AppError, ObjectRef};
use clipyard_storage::{ObjectStorage, StorageError};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

pub const SUCCESS_MESSAGE: &str = "Video converted successfully";

const INPUT_FILE: &str = "input.mp4";
const OUTPUT_FILE: &str = "output.mp4";

/// Stage of a conversion request, recorded in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStage {
    Validating,
    Downloading,
    Converting,
    Uploading,
    Done,
}

impl ConversionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversionStage::Validating => "validating",
            ConversionStage::Downloading => "downloading",
            ConversionStage::Converting => "converting",
            ConversionStage::Uploading => "uploading",
            ConversionStage::Done => "done",
        }
    }
}

impl fmt::Display for ConversionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Missing required field: input_url")]
    MissingInput,

    #[error("Failed to create working directory: {0}")]
    Workspace(#[source] std::io::Error),

    #[error("Failed to download {object}: {source}")]
    Download {
        object: ObjectRef,
        #[source]
        source: StorageError,
    },

    #[error("Conversion timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),

    #[error("Failed to start converter: {0}")]
    Launch(#[source] std::io::Error),

    #[error("Conversion failed with exit code {:?}", .exit_code)]
    Failed {
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("Conversion produced no output file")]
    OutputMissing { stdout: String, stderr: String },

    #[error("Failed to upload {object}: {source}")]
    Upload {
        object: ObjectRef,
        #[source]
        source: StorageError,
        local_file_exists: bool,
        local_file_size: Option<u64>,
    },
}

impl ConversionError {
    /// Stage the request was in when it failed.
    pub fn stage(&self) -> ConversionStage {
        match self {
            ConversionError::MissingInput | ConversionError::Workspace(_) => {
                ConversionStage::Validating
            }
            ConversionError::Download { .. } => ConversionStage::Downloading,
            ConversionError::Timeout(_)
            | ConversionError::Launch(_)
            | ConversionError::Failed { .. }
            | ConversionError::OutputMissing { .. } => ConversionStage::Converting,
            ConversionError::Upload { .. } => ConversionStage::Uploading,
        }
    }
}

impl From<ConversionError> for AppError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::MissingInput => AppError::InvalidInput(err.to_string()),
            ConversionError::Download { object, source } => {
                AppError::NotFound(format!("Failed to download {}: {}", object, source))
            }
            ConversionError::Timeout(_) => AppError::Timeout(err.to_string()),
            ConversionError::Failed {
                exit_code,
                stdout,
                stderr,
            } => AppError::ConversionFailed {
                message: "Conversion failed".to_string(),
                exit_code,
                stdout,
                stderr,
            },
            ConversionError::OutputMissing { stdout, stderr } => {
                AppError::OutputMissing { stdout, stderr }
            }
            ConversionError::Upload {
                source,
                local_file_exists,
                local_file_size,
                ..
            } => AppError::UploadFailed {
                message: source.to_string(),
                local_file_exists,
                local_file_size,
            },
            ConversionError::Launch(_) | ConversionError::Workspace(_) => {
                AppError::Internal(err.to_string())
            }
        }
    }
}

/// A converted video stored back in object storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutcome {
    pub output_url: String,
    pub output_key: String,
    /// Converter stdout.
    pub log: String,
}

/// Default output key: the input key with its last extension replaced by
/// `_vertical.mp4`. The directory prefix is kept and leading dots in the file name
/// do not start an extension.
pub fn derive_output_key(input_key: &str) -> String {
    let name_start = input_key.rfind('/').map_or(0, |idx| idx + 1);
    let name = &input_key[name_start..];

    let leading_dots = name.len() - name.trim_start_matches('.').len();
    let stem_len = match name[leading_dots..].rfind('.') {
        Some(idx) => leading_dots + idx,
        None => name.len(),
    };

    format!("{}_vertical.mp4", &input_key[..name_start + stem_len])
}

pub struct ConversionOrchestrator {
    storage: Arc<dyn ObjectStorage>,
    converter: ExternalConverter,
    default_bucket: String,
}

impl ConversionOrchestrator {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        converter: ExternalConverter,
        default_bucket: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            converter,
            default_bucket: default_bucket.into(),
        }
    }

    /// Convert the object at `input_url` and store the result in the same bucket.
    ///
    /// A blank `output_key` counts as absent.
    pub async fn convert(
        &self,
        input_url: Option<&str>,
        output_key: Option<&str>,
    ) -> Result<ConversionOutcome, ConversionError> {
        let start = Instant::now();
        let result = self.run_stages(input_url, output_key).await;

        match &result {
            Ok(outcome) => tracing::info!(
                stage = %ConversionStage::Done,
                output_key = %outcome.output_key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Conversion completed"
            ),
            Err(e) => tracing::error!(
                stage = %e.stage(),
                error = %e,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Conversion failed"
            ),
        }

        result
    }

    async fn run_stages(
        &self,
        input_url: Option<&str>,
        output_key: Option<&str>,
    ) -> Result<ConversionOutcome, ConversionError> {
        tracing::debug!(stage = %ConversionStage::Validating, "Validating conversion request");

        let input_url = input_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(ConversionError::MissingInput)?;

        let source = parse_object_url(input_url, &self.default_bucket);

        let output_key = match output_key.map(str::trim).filter(|key| !key.is_empty()) {
            Some(key) => key.trim_start_matches('/').to_string(),
            None => derive_output_key(&source.key),
        };
        let target = ObjectRef::new(source.bucket.clone(), output_key);

        let workdir = tempfile::Builder::new()
            .prefix("clipyard-convert-")
            .tempdir()
            .map_err(ConversionError::Workspace)?;
        let input_path = workdir.path().join(INPUT_FILE);
        let output_path = workdir.path().join(OUTPUT_FILE);

        tracing::info!(
            stage = %ConversionStage::Downloading,
            bucket = %source.bucket,
            key = %source.key,
            "Downloading source video"
        );
        self.download(&source, &input_path).await?;

        tracing::info!(
            stage = %ConversionStage::Converting,
            executable = %self.converter.executable(),
            "Running converter"
        );
        let process = self
            .converter
            .run(&input_path, &output_path)
            .await
            .map_err(|e| match e {
                ConverterError::Timeout(limit) => ConversionError::Timeout(limit),
                ConverterError::Spawn(io) => ConversionError::Launch(io),
            })?;

        if !process.success() {
            return Err(ConversionError::Failed {
                exit_code: process.exit_code,
                stdout: process.stdout,
                stderr: process.stderr,
            });
        }

        if !tokio::fs::try_exists(&output_path).await.unwrap_or(false) {
            return Err(ConversionError::OutputMissing {
                stdout: process.stdout,
                stderr: process.stderr,
            });
        }

        tracing::info!(
            stage = %ConversionStage::Uploading,
            bucket = %target.bucket,
            key = %target.key,
            "Uploading converted video"
        );
        self.upload(&target, &output_path).await?;

        Ok(ConversionOutcome {
            output_url: self.storage.object_url(&target.bucket, &target.key),
            output_key: target.key,
            log: process.stdout,
        })
    }

    async fn download(&self, object: &ObjectRef, path: &Path) -> Result<(), ConversionError> {
        let to_error = |source| ConversionError::Download {
            object: object.clone(),
            source,
        };

        let data = self
            .storage
            .get_object(&object.bucket, &object.key)
            .await
            .map_err(to_error)?;

        tokio::fs::write(path, &data)
            .await
            .map_err(|e| to_error(StorageError::IoError(e)))
    }

    async fn upload(&self, object: &ObjectRef, path: &Path) -> Result<(), ConversionError> {
        let result = match tokio::fs::read(path).await {
            Ok(data) => {
                self.storage
                    .put_object(&object.bucket, &object.key, data)
                    .await
            }
            Err(e) => Err(StorageError::IoError(e)),
        };

        if let Err(source) = result {
            let metadata = tokio::fs::metadata(path).await.ok();
            return Err(ConversionError::Upload {
                object: object.clone(),
                source,
                local_file_exists: metadata.is_some(),
                local_file_size: metadata.map(|m| m.len()),
            });
        }

        Ok(())
    }
}
