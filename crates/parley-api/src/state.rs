//! Application state wiring the chat service to the configured Model Client.
//!
//! AppState is cloned into every axum handler; the chat service is shared
//! behind an `Arc`.

use std::sync::Arc;

use parley_core::chat::conversation::GenerationSettings;
use parley_core::chat::registry::{RegistryLimits, SessionRegistry};
use parley_core::chat::service::ChatService;
use parley_core::llm::box_provider::BoxLlmProvider;
use parley_infra::llm::{create_provider, resolve_api_key};
use parley_types::config::AppConfig;

/// Shared application state used by the REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ChatService>,
}

impl AppState {
    /// Wire a registry around `provider` using the limits and generation
    /// settings from `config`.
    pub fn with_provider(provider: BoxLlmProvider, config: &AppConfig) -> Self {
        let registry = SessionRegistry::new(
            Arc::new(provider),
            GenerationSettings::from_config(&config.model),
            RegistryLimits::from_config(&config.sessions),
        );

        Self {
            chat_service: Arc::new(ChatService::new(Arc::new(registry))),
        }
    }

    /// Build the Model Client from `config` and wire the services.
    ///
    /// The API key is read here; a missing key does not fail startup.
    pub fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let api_key = resolve_api_key(&config.model.api_key_env);
        let provider = create_provider(&config.model, api_key)?;
        Ok(Self::with_provider(provider, config))
    }

    /// The registry behind the chat service.
    pub fn registry(&self) -> Arc<SessionRegistry> {
        Arc::clone(self.chat_service.registry())
    }
}
