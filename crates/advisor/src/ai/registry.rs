//! Provider registry.
//!
//! Holds the configured LLM providers behind their names. Constructed once
//! at startup and injected wherever a provider is needed — deliberately not
//! a process-global singleton.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::anthropic::AnthropicProvider;
use super::openai::OpenAiProvider;
use super::provider::{LlmError, LlmProvider};

/// Registry of LLM providers keyed by name.
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, Arc<dyn LlmProvider>>>,
}

impl ProviderRegistry {
    /// Create an empty provider registry.
    pub fn new() -> Self {
        Self {
            providers: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry with the default providers registered from the
    /// environment. Providers without keys are still registered; they
    /// surface as unconfigured.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register(Arc::new(AnthropicProvider::from_env()));
        registry.register(Arc::new(OpenAiProvider::from_env()));
        registry
    }

    /// Register a provider under its own name.
    pub fn register(&self, provider: Arc<dyn LlmProvider>) {
        let mut providers = self.providers.write().unwrap();
        providers.insert(provider.name().to_string(), provider);
    }

    /// Get a provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn LlmProvider>> {
        let providers = self.providers.read().unwrap();
        providers.get(name).cloned()
    }

    /// Get the first configured provider.
    pub fn get_configured(&self) -> Option<Arc<dyn LlmProvider>> {
        let providers = self.providers.read().unwrap();
        providers.values().find(|p| p.is_configured()).cloned()
    }

    /// Get a configured provider by name, returning an error when it is
    /// missing or has no credentials.
    pub fn require(&self, name: &str) -> Result<Arc<dyn LlmProvider>, LlmError> {
        let provider = self
            .get(name)
            .ok_or_else(|| LlmError::Auth(format!("Provider '{name}' is not registered")))?;
        if !provider.is_configured() {
            return Err(LlmError::Auth(format!(
                "Provider '{name}' has no API key; set {}",
                provider.api_key_env_var()
            )));
        }
        Ok(provider)
    }

    /// Get all registered provider names.
    pub fn provider_names(&self) -> Vec<String> {
        let providers = self.providers.read().unwrap();
        providers.keys().cloned().collect()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
