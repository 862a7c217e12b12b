//! Application setup: storage, service cores and routers from a [`Config`].

pub mod routes;
pub mod server;
pub mod telemetry;

use crate::state::{AutocropState, OrganizerState};
use anyhow::Result;
use axum::Router;
use clipyard_core::Config;
use clipyard_processing::{ConversionOrchestrator, ExternalConverter, RelocationEngine};
use clipyard_storage::create_storage;

pub const AUTOCROP_DEFAULT_PORT: u16 = 8083;
pub const ORGANIZER_DEFAULT_PORT: u16 = 8084;

/// Build the autocrop router.
pub async fn initialize_autocrop(config: &Config) -> Result<Router> {
    let storage = create_storage(&config.storage).await?;
    let converter = ExternalConverter::from_config(&config.conversion);

    tracing::info!(
        executable = %converter.executable(),
        timeout_secs = converter.timeout().as_secs(),
        "Conversion executable configured"
    );

    let endpoint = storage.endpoint().to_string();
    let orchestrator = ConversionOrchestrator::new(storage, converter, config.default_bucket());

    Ok(routes::autocrop_routes(AutocropState::new(
        endpoint,
        orchestrator,
    )))
}

/// Build the organizer router.
pub async fn initialize_organizer(config: &Config) -> Result<Router> {
    let storage = create_storage(&config.storage).await?;
    let endpoint = storage.endpoint().to_string();
    let engine = RelocationEngine::new(storage, config.default_bucket());

    Ok(routes::organizer_routes(OrganizerState::new(endpoint, engine)))
}
