//! Autocrop API integration tests.
//!
//! The conversion executable is replaced by shell scripts, so these run on unix only.

#![cfg(unix)]

mod helpers;

use helpers::{object_url, setup_autocrop, BUCKET};
use serde_json::json;

const COPY_SCRIPT: &str = r#"echo "cropped $2"; cp "$2" "$4""#;

#[tokio::test]
async fn test_convert_stores_vertical_video() {
    let app = setup_autocrop(COPY_SCRIPT, 10).await;
    app.seed("b", &["clip.mp4"]).await;

    let response = app
        .client()
        .post("/convert")
        .json(&json!({ "input_url": "http://minio:9000/b/clip.mp4" }))
        .await;

    assert_eq!(response.status_code(), 200);
    let data: serde_json::Value = response.json();
    assert_eq!(data["success"], true);
    assert_eq!(data["output_key"], "clip_vertical.mp4");
    assert_eq!(data["output_url"], object_url("b", "clip_vertical.mp4"));
    assert_eq!(data["message"], "Video converted successfully");
    assert!(data["log"].as_str().unwrap().starts_with("cropped "));

    assert!(app.keys("b").await.contains(&"clip_vertical.mp4".to_string()));
}

#[tokio::test]
async fn test_convert_honours_output_key() {
    let app = setup_autocrop(COPY_SCRIPT, 10).await;
    app.seed(BUCKET, &["video_split_1.mp4"]).await;

    let response = app
        .client()
        .post("/convert")
        .json(&json!({
            "input_url": object_url(BUCKET, "video_split_1.mp4"),
            "output_key": "video_vertical.mp4"
        }))
        .await;

    assert_eq!(response.status_code(), 200);
    let data: serde_json::Value = response.json();
    assert_eq!(data["output_key"], "video_vertical.mp4");
    assert_eq!(data["output_url"], object_url(BUCKET, "video_vertical.mp4"));
}

#[tokio::test]
async fn test_missing_input_url_is_400() {
    let app = setup_autocrop(COPY_SCRIPT, 10).await;

    for body in [json!({}), json!({ "input_url": "" }), json!({ "output_key": "x.mp4" })] {
        let response = app.client().post("/convert").json(&body).await;
        assert_eq!(response.status_code(), 400);
        let data: serde_json::Value = response.json();
        assert_eq!(data["success"], false);
        assert_eq!(data["error"], "Missing required field: input_url");
    }

    let response = app.client().post("/convert").text("garbage").await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_missing_source_is_404() {
    let app = setup_autocrop(COPY_SCRIPT, 10).await;

    let response = app
        .client()
        .post("/convert")
        .json(&json!({ "input_url": object_url(BUCKET, "nope.mp4") }))
        .await;

    assert_eq!(response.status_code(), 404);
    let data: serde_json::Value = response.json();
    assert_eq!(data["success"], false);
    assert_eq!(data["error_type"], "NotFoundError");
}

#[tokio::test]
async fn test_timeout_is_408() {
    let app = setup_autocrop("sleep 5", 1).await;
    app.seed(BUCKET, &["clip.mp4"]).await;

    let response = app
        .client()
        .post("/convert")
        .json(&json!({ "input_url": object_url(BUCKET, "clip.mp4") }))
        .await;

    assert_eq!(response.status_code(), 408);
    let data: serde_json::Value = response.json();
    assert_eq!(data["code"], "TIMEOUT");
    assert_eq!(data["error"], "Conversion timed out after 1 seconds");
}

#[tokio::test]
async fn test_exit_zero_without_output_is_500() {
    let app = setup_autocrop("echo 'done, honest'", 10).await;
    app.seed(BUCKET, &["clip.mp4"]).await;

    let response = app
        .client()
        .post("/convert")
        .json(&json!({ "input_url": object_url(BUCKET, "clip.mp4") }))
        .await;

    assert_eq!(response.status_code(), 500);
    let data: serde_json::Value = response.json();
    assert_eq!(data["success"], false);
    assert_eq!(data["code"], "OUTPUT_MISSING");
    assert_eq!(data["error_type"], "ExecutionError");
    assert_eq!(data["details"]["stdout"], "done, honest\n");
    assert_eq!(app.keys(BUCKET).await, vec!["clip.mp4"]);
}

#[tokio::test]
async fn test_converter_failure_is_500_with_streams() {
    let app = setup_autocrop("echo 'no face detected' >&2; exit 4", 10).await;
    app.seed(BUCKET, &["clip.mp4"]).await;

    let response = app
        .client()
        .post("/convert")
        .json(&json!({ "input_url": object_url(BUCKET, "clip.mp4") }))
        .await;

    assert_eq!(response.status_code(), 500);
    let data: serde_json::Value = response.json();
    assert_eq!(data["code"], "CONVERSION_FAILED");
    assert_eq!(data["details"]["exit_code"], 4);
    assert_eq!(data["details"]["stderr"], "no face detected\n");
}
