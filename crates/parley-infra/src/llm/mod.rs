//! LLM provider implementations.
//!
//! Contains the concrete [`LlmProvider`](parley_core::llm::provider::LlmProvider)
//! used as Parley's Model Client, plus a factory ([`create_provider`]) that
//! builds it from the `[model]` config section.

pub mod openai_compat;

use secrecy::SecretString;

use parley_core::llm::box_provider::BoxLlmProvider;
use parley_types::config::ModelConfig;
use parley_types::llm::{LlmError, ProviderType};

use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::{compatible_defaults, openai_defaults};

/// Key sent when the configured environment variable is unset. The provider
/// rejects it on the first call, which surfaces as a model failure.
pub const PLACEHOLDER_API_KEY: &str = "your-api-key-here";

/// Read the provider credential from the environment variable `env_var`.
///
/// A missing or empty variable is not an error here; a placeholder is
/// returned and a warning logged.
pub fn resolve_api_key(env_var: &str) -> SecretString {
    match std::env::var(env_var) {
        Ok(key) if !key.trim().is_empty() => SecretString::from(key),
        _ => {
            tracing::warn!(
                env_var,
                "API key environment variable not set; model calls will fail until it is"
            );
            SecretString::from(PLACEHOLDER_API_KEY.to_string())
        }
    }
}

/// Create a [`BoxLlmProvider`] from the `[model]` config section.
///
/// # Errors
///
/// Returns [`LlmError::InvalidRequest`] if `openai_compatible` is selected
/// without a `base_url`.
pub fn create_provider(config: &ModelConfig, api_key: SecretString) -> Result<BoxLlmProvider, LlmError> {
    let compat_config = match config.provider {
        ProviderType::OpenAi => {
            let mut defaults = openai_defaults(api_key, &config.model);
            if let Some(ref base_url) = config.base_url {
                defaults.base_url = base_url.trim_end_matches('/').to_string();
            }
            defaults
        }
        ProviderType::OpenAiCompatible => {
            let base_url = config.base_url.as_deref().ok_or_else(|| {
                LlmError::InvalidRequest(
                    "provider 'openai_compatible' requires model.base_url".to_string(),
                )
            })?;
            compatible_defaults(base_url, api_key, &config.model)
        }
    };

    tracing::info!(
        provider = %compat_config.provider_name,
        base_url = %compat_config.base_url,
        model = %compat_config.model,
        "Model client configured"
    );

    Ok(BoxLlmProvider::new(OpenAiCompatibleProvider::new(compat_config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn key() -> SecretString {
        SecretString::from("sk-test".to_string())
    }

    #[test]
    fn test_create_openai_provider() {
        let provider = create_provider(&ModelConfig::default(), key()).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_create_compatible_provider_requires_base_url() {
        let config = ModelConfig {
            provider: ProviderType::OpenAiCompatible,
            ..Default::default()
        };
        let err = create_provider(&config, key()).err().unwrap();
        assert!(matches!(err, LlmError::InvalidRequest(_)));

        let config = ModelConfig {
            provider: ProviderType::OpenAiCompatible,
            base_url: Some("http://localhost:11434/v1".to_string()),
            ..Default::default()
        };
        let provider = create_provider(&config, key()).unwrap();
        assert_eq!(provider.name(), "openai_compatible");
    }

    #[test]
    fn test_resolve_api_key_falls_back_to_placeholder() {
        let key = resolve_api_key("PARLEY_TEST_SURELY_UNSET_API_KEY");
        assert_eq!(key.expose_secret(), PLACEHOLDER_API_KEY);
    }
}
