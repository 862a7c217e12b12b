//! Application state for the two services.
//!
//! Each service has its own state type. The health handler is shared and extracts
//! only [`ServiceInfo`] via Axum's `FromRef`.

use axum::extract::FromRef;
use clipyard_processing::{ConversionOrchestrator, RelocationEngine};
use std::sync::Arc;

pub const AUTOCROP_SERVICE: &str = "autocrop";
pub const ORGANIZER_SERVICE: &str = "minio-organizer";

/// Identity reported by `GET /health`.
#[derive(Clone, Debug)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub endpoint: String,
}

#[derive(Clone)]
pub struct AutocropState {
    pub info: ServiceInfo,
    pub orchestrator: Arc<ConversionOrchestrator>,
}

impl AutocropState {
    pub fn new(endpoint: impl Into<String>, orchestrator: ConversionOrchestrator) -> Self {
        Self {
            info: ServiceInfo {
                name: AUTOCROP_SERVICE,
                endpoint: endpoint.into(),
            },
            orchestrator: Arc::new(orchestrator),
        }
    }
}

impl FromRef<AutocropState> for ServiceInfo {
    fn from_ref(state: &AutocropState) -> Self {
        state.info.clone()
    }
}

#[derive(Clone)]
pub struct OrganizerState {
    pub info: ServiceInfo,
    pub engine: Arc<RelocationEngine>,
}

impl OrganizerState {
    pub fn new(endpoint: impl Into<String>, engine: RelocationEngine) -> Self {
        Self {
            info: ServiceInfo {
                name: ORGANIZER_SERVICE,
                endpoint: endpoint.into(),
            },
            engine: Arc::new(engine),
        }
    }
}

impl FromRef<OrganizerState> for ServiceInfo {
    fn from_ref(state: &OrganizerState) -> Self {
        state.info.clone()
    }
}
