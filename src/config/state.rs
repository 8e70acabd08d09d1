// Application state module
// Read-only state shared across requests

use std::sync::Arc;

use super::types::Config;
use crate::gateway::transport::QueryTransport;

/// Application state
///
/// Built once at startup and never mutated: the configuration and the
/// outbound query transport are the only things requests share.
pub struct AppState {
    pub config: Config,
    pub transport: Arc<dyn QueryTransport>,
}

impl AppState {
    pub fn new(config: Config, transport: Arc<dyn QueryTransport>) -> Self {
        Self { config, transport }
    }
}
