// Application state module
// Shared, read-only collaborators handed to every request

use std::sync::Arc;

use super::types::Config;
use crate::assets::AssetStore;
use crate::background::BackgroundTasks;
use crate::generation::TextGenerator;

/// Application state
pub struct AppState {
    pub config: Config,
    pub generator: Arc<dyn TextGenerator>,
    pub assets: Arc<dyn AssetStore>,
    /// Deferred work that outlives the response that scheduled it
    pub background: BackgroundTasks,
}

impl AppState {
    pub fn new(
        config: Config,
        generator: Arc<dyn TextGenerator>,
        assets: Arc<dyn AssetStore>,
    ) -> Self {
        Self {
            config,
            generator,
            assets,
            background: BackgroundTasks::new(),
        }
    }
}
