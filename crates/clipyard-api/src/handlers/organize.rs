//! `POST /organize`

use crate::error::{HttpAppError, ValidatedJson};
use crate::state::OrganizerState;
use axum::{extract::State, Json};
use clipyard_core::models::{OrganizeRequest, OrganizeResponse};
use clipyard_core::AppError;
use serde_json::Value as JsonValue;

/// Move each file into the execution folder.
///
/// The body is validated in full before any storage call. Files that cannot be
/// moved are reported with their original URL.
pub async fn organize_files(
    State(state): State<OrganizerState>,
    ValidatedJson(body): ValidatedJson<JsonValue>,
) -> Result<Json<OrganizeResponse>, HttpAppError> {
    let request = OrganizeRequest::from_json(&body)?;

    tracing::info!(
        execution_folder = %request.execution_folder,
        file_count = request.file_urls.len(),
        "Organizing files"
    );

    let engine = state.engine.clone();
    let folder = request.execution_folder.clone();
    let task = tokio::spawn(async move {
        engine
            .organize_list(&request.execution_folder, &request.file_urls)
            .await
    });

    let organized = task
        .await
        .map_err(|e| AppError::Internal(format!("Organize task failed: {}", e)))?;

    tracing::info!(
        execution_folder = %folder,
        count = organized.len(),
        "Files organized"
    );

    Ok(Json(OrganizeResponse::new(folder, organized)))
}
