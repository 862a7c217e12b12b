//! Request and response bodies for the autocrop and organizer services.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::AppError;

/// Body of `POST /convert`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConvertRequest {
    #[serde(default)]
    pub input_url: Option<String>,
    #[serde(default)]
    pub output_key: Option<String>,
}

/// Successful `POST /convert` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertResponse {
    pub success: bool,
    pub output_url: String,
    pub output_key: String,
    pub message: String,
    pub log: String,
}

/// Validated body of `POST /organize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizeRequest {
    pub execution_folder: String,
    pub file_urls: Vec<String>,
}

impl OrganizeRequest {
    /// Validate a raw JSON body.
    ///
    /// Runs before any storage call: a missing field, a non-array `file_urls` or a
    /// non-string entry rejects the whole request.
    pub fn from_json(body: &JsonValue) -> Result<Self, AppError> {
        let missing =
            || AppError::InvalidInput("Missing required fields: execution_folder, file_urls".into());

        let object = body.as_object().ok_or_else(missing)?;
        let folder = object
            .get("execution_folder")
            .filter(|v| !v.is_null())
            .ok_or_else(missing)?;
        let file_urls = object
            .get("file_urls")
            .filter(|v| !v.is_null())
            .ok_or_else(missing)?;

        let execution_folder = folder
            .as_str()
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::InvalidInput("execution_folder must be a non-empty string".into())
            })?;

        let entries = file_urls
            .as_array()
            .ok_or_else(|| AppError::InvalidInput("file_urls must be an array".into()))?;

        let file_urls = entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                entry.as_str().map(str::to_string).ok_or_else(|| {
                    AppError::InvalidInput(format!("file_urls[{}] must be a string", idx))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            execution_folder,
            file_urls,
        })
    }
}

/// Successful `POST /organize` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizeResponse {
    pub success: bool,
    pub execution_folder: String,
    pub organized_files: Vec<String>,
    pub count: usize,
}

impl OrganizeResponse {
    pub fn new(execution_folder: String, organized_files: Vec<String>) -> Self {
        Self {
            success: true,
            count: organized_files.len(),
            execution_folder,
            organized_files,
        }
    }
}

/// `GET /health` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    #[serde(rename = "minio-endpoint")]
    pub minio_endpoint: String,
    /// Same value as `minio-endpoint`; kept for existing workflow definitions.
    pub minio: String,
}

impl HealthResponse {
    pub fn healthy(service: &str, endpoint: &str) -> Self {
        Self {
            status: "healthy".to_string(),
            service: service.to_string(),
            minio_endpoint: endpoint.to_string(),
            minio: endpoint.to_string(),
        }
    }
}
