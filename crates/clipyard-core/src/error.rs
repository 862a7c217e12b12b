//! Error types module
//!
//! All failures that reach a caller are expressed as an `AppError`. The variants map
//! onto the service error classes: validation (400), not found (404), timeout (408),
//! execution (500), storage (500) and unexpected (500).

use serde_json::{json, Value as JsonValue};

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for failures caused by caller input or slow executables
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "STORAGE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Error class name reported alongside the code
    fn error_type(&self) -> &'static str;

    /// Client-facing message
    fn client_message(&self) -> String;

    /// Structured diagnostics for the caller, if any
    fn details(&self) -> Option<JsonValue>;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Conversion failed: {message}")]
    ConversionFailed {
        message: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("Conversion produced no output file")]
    OutputMissing { stdout: String, stderr: String },

    #[error("Upload failed: {message}")]
    UploadFailed {
        message: String,
        local_file_exists: bool,
        local_file_size: Option<u64>,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Static metadata for each variant: (http_status, error_code, error_type, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, &'static str, LogLevel) {
    match err {
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", "ValidationError", LogLevel::Debug),
        AppError::NotFound(_) => (404, "NOT_FOUND", "NotFoundError", LogLevel::Warn),
        AppError::Timeout(_) => (408, "TIMEOUT", "TimeoutError", LogLevel::Warn),
        AppError::ConversionFailed { .. } => (
            500,
            "CONVERSION_FAILED",
            "ExecutionError",
            LogLevel::Error,
        ),
        AppError::OutputMissing { .. } => {
            (500, "OUTPUT_MISSING", "ExecutionError", LogLevel::Error)
        }
        AppError::UploadFailed { .. } => (500, "UPLOAD_FAILED", "StorageError", LogLevel::Error),
        AppError::Storage(_) => (500, "STORAGE_ERROR", "StorageError", LogLevel::Error),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", "UnexpectedError", LogLevel::Error),
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn error_type(&self) -> &'static str {
        app_error_static_metadata(self).2
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg)
            | AppError::NotFound(msg)
            | AppError::Timeout(msg)
            | AppError::Storage(msg)
            | AppError::Internal(msg) => msg.clone(),
            AppError::ConversionFailed { message, .. } => message.clone(),
            AppError::OutputMissing { .. } => {
                "Conversion reported success but produced no output file".to_string()
            }
            AppError::UploadFailed { message, .. } => {
                format!("Failed to upload converted video: {}", message)
            }
        }
    }

    fn details(&self) -> Option<JsonValue> {
        match self {
            AppError::ConversionFailed {
                exit_code,
                stdout,
                stderr,
                ..
            } => Some(json!({
                "exit_code": exit_code,
                "stdout": stdout,
                "stderr": stderr,
            })),
            AppError::OutputMissing { stdout, stderr } => Some(json!({
                "stdout": stdout,
                "stderr": stderr,
            })),
            AppError::UploadFailed {
                message,
                local_file_exists,
                local_file_size,
            } => Some(json!({
                "error": message,
                "local_file_exists": local_file_exists,
                "local_file_size": local_file_size,
            })),
            _ => None,
        }
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }
}
