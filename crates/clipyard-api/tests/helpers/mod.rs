//! Test helpers: build routers over local storage in a temporary directory.
//!
//! Run from workspace root: `cargo test -p clipyard-api`.

#![allow(dead_code)]

use axum_test::TestServer;
use clipyard_api::setup;
use clipyard_core::Config;
use clipyard_storage::{LocalStorage, ObjectStorage};
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;

pub const ENDPOINT: &str = "http://minio:9000";
pub const BUCKET: &str = "nca-toolkit";

/// Test application: server plus a handle on the same storage directory.
pub struct TestApp {
    pub server: TestServer,
    pub storage: LocalStorage,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub async fn seed(&self, bucket: &str, keys: &[&str]) {
        for key in keys {
            self.storage
                .put_object(bucket, key, key.as_bytes().to_vec())
                .await
                .expect("Failed to seed object");
        }
    }

    pub async fn keys(&self, bucket: &str) -> Vec<String> {
        self.storage
            .list_objects(bucket)
            .await
            .expect("Failed to list objects")
    }
}

pub fn object_url(bucket: &str, key: &str) -> String {
    format!("{}/{}/{}", ENDPOINT, bucket, key)
}

fn config(temp_dir: &TempDir, extra: &[(&str, String)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("STORAGE_BACKEND".to_string(), "local".to_string()),
        (
            "LOCAL_STORAGE_PATH".to_string(),
            temp_dir.path().join("store").to_string_lossy().into_owned(),
        ),
        ("S3_ENDPOINT_URL".to_string(), ENDPOINT.to_string()),
        ("S3_BUCKET_NAME".to_string(), BUCKET.to_string()),
    ]);
    for (key, value) in extra {
        vars.insert(key.to_string(), value.clone());
    }
    Config::from_lookup(0, |key| vars.get(key).cloned()).expect("Invalid test config")
}

async fn local_storage(temp_dir: &TempDir) -> LocalStorage {
    LocalStorage::new(temp_dir.path().join("store"), ENDPOINT)
        .await
        .expect("Failed to create local storage")
}

/// Organizer service over local storage.
pub async fn setup_organizer() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = config(&temp_dir, &[]);
    let router = setup::initialize_organizer(&config)
        .await
        .expect("Failed to build organizer");

    TestApp {
        server: TestServer::new(router).expect("Failed to create test server"),
        storage: local_storage(&temp_dir).await,
        temp_dir,
    }
}

/// Autocrop service whose executable is a shell script with the given body.
///
/// The script receives `--input <in> --output <out>`, so `$2` is the input path
/// and `$4` the output path.
#[cfg(unix)]
pub async fn setup_autocrop(script_body: &str, timeout_secs: u64) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let executable = write_script(temp_dir.path(), script_body);
    let config = config(
        &temp_dir,
        &[
            ("AUTOCROP_EXECUTABLE", executable),
            ("AUTOCROP_TIMEOUT_SECS", timeout_secs.to_string()),
        ],
    );
    let router = setup::initialize_autocrop(&config)
        .await
        .expect("Failed to build autocrop");

    TestApp {
        server: TestServer::new(router).expect("Failed to create test server"),
        storage: local_storage(&temp_dir).await,
        temp_dir,
    }
}

#[cfg(unix)]
fn write_script(dir: &Path, body: &str) -> String {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("autocrop.sh");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("Failed to write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to chmod script");
    path.to_string_lossy().into_owned()
}
