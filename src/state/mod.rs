use std::sync::Arc;

use crate::config::ServerConfig;
use crate::core::CoreState;

/// Application state that can be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    /// Speech capabilities shared by every call
    pub core_state: Arc<CoreState>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Arc<Self> {
        let core_state = CoreState::new(&config);
        Self::with_core_state(config, core_state)
    }

    /// Build with explicit capabilities instead of the configured providers.
    pub fn with_core_state(config: ServerConfig, core_state: Arc<CoreState>) -> Arc<Self> {
        Arc::new(Self { config, core_state })
    }
}
