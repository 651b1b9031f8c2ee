use crate::analysis::orchestrator::Orchestrator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Single holder of the submission lifecycle. Clones share one state.
    pub orchestrator: Orchestrator,
}
