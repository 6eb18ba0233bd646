use std::sync::Arc;

use crate::config::Config;
use crate::gateway::AnalysisGateway;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns the process-wide rate limiter and result cache.
    pub gateway: Arc<AnalysisGateway>,
    pub config: Config,
}
