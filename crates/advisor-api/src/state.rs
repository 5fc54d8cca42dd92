//! Shared server state.

use std::sync::Arc;

use advisor::analysis::PROMPT_SCHEMA_VERSION;
use advisor::{
    EngineSettings, GenerateOptions, ProviderRegistry, RecommendationCache, ResourceStore,
    TaskRegistry,
};

use crate::config::Config;

/// Dependencies injected into every handler.
///
/// Everything lives behind this one struct — no module-level singletons —
/// so tests can assemble a server with scripted providers and a throwaway
/// inventory.
pub struct AppState {
    pub registry: Arc<TaskRegistry>,
    pub providers: Arc<ProviderRegistry>,
    pub inventory: Arc<dyn ResourceStore>,
    pub cache: RecommendationCache,
    pub config: Config,
}

impl AppState {
    /// Engine settings derived from the service configuration.
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            model: self.config.model.clone(),
            platform: self.config.platform.clone(),
            schema_version: PROMPT_SCHEMA_VERSION.to_string(),
            options: GenerateOptions {
                temperature: None,
                max_tokens: self.config.max_tokens,
            },
        }
    }
}
