//! Configuration module
//!
//! Both services read the same environment variables. Configuration is loaded once
//! at startup and passed down explicitly; nothing else in the workspace reads the
//! environment.

use std::env;
use std::time::Duration;

use crate::storage_types::StorageBackend;

const DEFAULT_ENDPOINT: &str = "http://minio:9000";
const DEFAULT_ACCESS_KEY: &str = "minioadmin";
const DEFAULT_SECRET_KEY: &str = "minioadmin";
const DEFAULT_BUCKET: &str = "nca-toolkit";
const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_EXECUTABLE: &str = "autocrop";
const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// HTTP server settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub environment: String,
    /// Emit logs as JSON lines instead of the compact console format.
    pub json_logs: bool,
}

/// Object storage connection settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Endpoint of the S3-compatible service. Returned object URLs are built from it.
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub default_bucket: String,
    pub region: String,
    /// Root directory for the local backend (one sub-directory per bucket).
    pub local_storage_path: Option<String>,
}

/// External conversion executable settings
#[derive(Clone, Debug)]
pub struct ConversionConfig {
    pub executable_path: String,
    pub timeout_seconds: u64,
}

impl ConversionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Application configuration shared by the autocrop and organizer services.
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub conversion: ConversionConfig,
}

impl Config {
    /// Load configuration from the process environment (and `.env` if present).
    ///
    /// `default_port` is used when `PORT` is not set; each service has its own.
    pub fn from_env(default_port: u16) -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(default_port, |key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(default_port: u16, lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => default_port,
        };

        let json_logs = match var("LOG_FORMAT").map(|f| f.trim().to_lowercase()) {
            None => false,
            Some(format) if format == "compact" => false,
            Some(format) if format == "json" => true,
            Some(other) => {
                return Err(anyhow::anyhow!(
                    "LOG_FORMAT must be 'compact' or 'json', got '{}'",
                    other
                ))
            }
        };

        let backend = match var("STORAGE_BACKEND") {
            Some(raw) => raw.parse::<StorageBackend>()?,
            None => StorageBackend::S3,
        };

        let timeout_seconds = match var("AUTOCROP_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("AUTOCROP_TIMEOUT_SECS must be a whole number"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let config = Config {
            server: ServerConfig {
                port,
                environment,
                json_logs,
            },
            storage: StorageConfig {
                backend,
                endpoint: var("S3_ENDPOINT_URL").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
                access_key: var("S3_ACCESS_KEY").unwrap_or_else(|| DEFAULT_ACCESS_KEY.to_string()),
                secret_key: var("S3_SECRET_KEY").unwrap_or_else(|| DEFAULT_SECRET_KEY.to_string()),
                default_bucket: var("S3_BUCKET_NAME").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
                region: var("S3_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
                local_storage_path: var("LOCAL_STORAGE_PATH"),
            },
            conversion: ConversionConfig {
                executable_path: var("AUTOCROP_EXECUTABLE")
                    .unwrap_or_else(|| DEFAULT_EXECUTABLE.to_string()),
                timeout_seconds,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.storage.endpoint.trim().is_empty() {
            return Err(anyhow::anyhow!("S3_ENDPOINT_URL cannot be empty"));
        }

        if self.storage.default_bucket.trim().is_empty() {
            return Err(anyhow::anyhow!("S3_BUCKET_NAME cannot be empty"));
        }

        if self.conversion.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("AUTOCROP_TIMEOUT_SECS cannot be 0"));
        }

        if self.storage.backend == StorageBackend::Local && self.storage.local_storage_path.is_none()
        {
            return Err(anyhow::anyhow!(
                "LOCAL_STORAGE_PATH must be set when using local storage backend"
            ));
        }

        Ok(())
    }

    pub fn server_port(&self) -> u16 {
        self.server.port
    }

    pub fn endpoint(&self) -> &str {
        &self.storage.endpoint
    }

    pub fn default_bucket(&self) -> &str {
        &self.storage.default_bucket
    }
}
