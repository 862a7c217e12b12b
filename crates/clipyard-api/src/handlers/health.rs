use crate::state::ServiceInfo;
use axum::{extract::State, Json};
use clipyard_core::models::HealthResponse;

pub async fn health(State(info): State<ServiceInfo>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(info.name, &info.endpoint))
}
