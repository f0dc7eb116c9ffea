// Application state module
// Shared by every connection task

use super::types::Config;
use crate::store::LayerStore;

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: LayerStore,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store = LayerStore::new(&config.store.path);
        Self { config, store }
    }
}
