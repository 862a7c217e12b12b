//! Clipyard Storage Library
//!
//! This crate provides the object storage abstraction used by the autocrop and
//! organizer services, with an S3-compatible backend and a local filesystem backend.
//!
//! # Addressing
//!
//! Objects are addressed by `(bucket, key)`. Keys are `/`-delimited; "folders" are only
//! a naming convention. Keys must not start with `/` or contain `..` segments.

pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use clipyard_core::StorageBackend;
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ObjectStorage, StorageError, StorageResult};
