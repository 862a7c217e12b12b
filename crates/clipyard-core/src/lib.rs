//! Clipyard Core Library
//!
//! This crate provides the configuration, error taxonomy, object URL codec and
//! request/response models shared by the autocrop and organizer services.

pub mod config;
pub mod error;
pub mod models;
pub mod object_url;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, ConversionConfig, ServerConfig, StorageConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use object_url::{format_object_url, parse_object_url, ObjectRef};
pub use storage_types::StorageBackend;
