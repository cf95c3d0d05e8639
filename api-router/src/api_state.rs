use std::sync::Arc;

use common::utils::config::AppConfig;
use file_search::FileSearchBackend;

/// Shared state for the facade: the loaded configuration and the service
/// client constructed in `main`.
#[derive(Clone)]
pub struct ApiState {
    pub config: AppConfig,
    pub search: Arc<dyn FileSearchBackend>,
}

impl ApiState {
    pub fn new(config: AppConfig, search: Arc<dyn FileSearchBackend>) -> Self {
        Self { config, search }
    }
}
