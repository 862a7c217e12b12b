//! `POST /convert`

use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AutocropState;
use axum::{extract::State, Json};
use clipyard_core::models::{ConvertRequest, ConvertResponse};
use clipyard_core::AppError;
use clipyard_processing::conversion::SUCCESS_MESSAGE;

/// Convert a horizontal video to vertical format.
///
/// The conversion runs in its own task so a client disconnect does not abort it.
pub async fn convert_video(
    State(state): State<AutocropState>,
    ValidatedJson(request): ValidatedJson<ConvertRequest>,
) -> Result<Json<ConvertResponse>, HttpAppError> {
    tracing::info!(
        input_url = ?request.input_url,
        output_key = ?request.output_key,
        "Conversion requested"
    );

    let orchestrator = state.orchestrator.clone();
    let task = tokio::spawn(async move {
        orchestrator
            .convert(request.input_url.as_deref(), request.output_key.as_deref())
            .await
    });

    let outcome = task
        .await
        .map_err(|e| AppError::Internal(format!("Conversion task failed: {}", e)))??;

    Ok(Json(ConvertResponse {
        success: true,
        output_url: outcome.output_url,
        output_key: outcome.output_key,
        message: SUCCESS_MESSAGE.to_string(),
        log: outcome.log,
    }))
}
