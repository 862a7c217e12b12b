//! Object URL codec
//!
//! Callers address objects with absolute URLs such as
//! `http://minio:9000/nca-toolkit/video_split_1.mp4`. The first path segment is the
//! bucket and the remainder is the key. A URL with a single path segment addresses
//! a key in the configured default bucket.

use percent_encoding::percent_decode_str;
use std::fmt;
use url::Url;

/// Identifies one object in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub bucket: String,
    /// Never begins with `/`.
    pub key: String,
}

impl ObjectRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            bucket: bucket.into(),
            key: key.trim_start_matches('/').to_string(),
        }
    }

    /// Final path segment of the key (empty when the key ends with `/`).
    pub fn file_name(&self) -> &str {
        match self.key.rfind('/') {
            Some(idx) => &self.key[idx + 1..],
            None => &self.key,
        }
    }

    /// Whether the key lives under `folder/`.
    pub fn is_in_folder(&self, folder: &str) -> bool {
        self.key.starts_with(&format!("{}/", folder))
    }

    pub fn to_url(&self, endpoint: &str) -> String {
        format_object_url(endpoint, &self.bucket, &self.key)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Split an object URL into bucket and percent-decoded key.
///
/// Strings that do not parse as absolute URLs are treated as a bare path
/// (query and fragment removed). Bucket names are not validated.
pub fn parse_object_url(url: &str, default_bucket: &str) -> ObjectRef {
    let path = url_path(url.trim());
    let path = path.trim_start_matches('/');

    match path.split_once('/') {
        Some((bucket, key)) => ObjectRef::new(bucket, decode(key)),
        None => ObjectRef::new(default_bucket, decode(path)),
    }
}

/// Build the public URL of an object: `{endpoint}/{bucket}/{key}`.
pub fn format_object_url(endpoint: &str, bucket: &str, key: &str) -> String {
    format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key)
}

fn url_path(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => {
            let end = url.find(['?', '#']).unwrap_or(url.len());
            url[..end].to_string()
        }
    }
}

fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}
