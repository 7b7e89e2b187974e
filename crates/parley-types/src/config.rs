//! Configuration types for Parley.
//!
//! `AppConfig` represents the top-level `config.toml` that controls the HTTP
//! listener, the Model Client, and the session registry bounds. Every field
//! has a default so an empty (or missing) file yields a working server.

use serde::{Deserialize, Serialize};

use crate::llm::ProviderType;

/// Top-level configuration for the Parley server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub sessions: SessionConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Model Client settings.
///
/// The API key itself never lives in the config file; `api_key_env` names the
/// environment variable it is read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_provider")]
    pub provider: ProviderType,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Override the provider's default base URL. Required for `openai_compatible`.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Per-call model timeout in seconds; 0 disables the timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_provider() -> ProviderType {
    ProviderType::OpenAi
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_system_prompt() -> String {
    "The following is a friendly conversation between a human and an AI. \
     The AI is talkative and provides lots of specific details from its context. \
     If the AI does not know the answer to a question, it truthfully says it does not know."
        .to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            base_url: None,
            api_key_env: default_api_key_env(),
            request_timeout_secs: default_request_timeout_secs(),
            system_prompt: default_system_prompt(),
        }
    }
}

/// Session registry bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum live sessions before the least recently active one is evicted.
    /// Zero disables the bound.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// Sessions idle longer than this are swept. Zero disables idle expiry.
    #[serde(default = "default_idle_ttl_secs")]
    pub idle_ttl_secs: u64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_max_sessions() -> usize {
    10_000
}

fn default_idle_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_sweep_interval_secs() -> u64 {
    60
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            idle_ttl_secs: default_idle_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.model.provider, ProviderType::OpenAi);
        assert_eq!(config.model.model, "gpt-3.5-turbo");
        assert!((config.model.temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.model.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.sessions.max_sessions, 10_000);
        assert_eq!(config.sessions.idle_ttl_secs, 86_400);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8000);
        assert!(config.model.base_url.is_none());
        assert!(config.model.system_prompt.starts_with("The following is a friendly"));
    }

    #[test]
    fn test_partial_toml_overrides_only_named_fields() {
        let config: AppConfig = toml::from_str(
            r#"
[server]
port = 9090

[model]
provider = "openai_compatible"
base_url = "http://localhost:11434/v1"
model = "llama3"

[sessions]
max_sessions = 0
"#,
        )
        .unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.model.provider, ProviderType::OpenAiCompatible);
        assert_eq!(config.model.base_url.as_deref(), Some("http://localhost:11434/v1"));
        assert_eq!(config.model.model, "llama3");
        assert_eq!(config.model.max_tokens, 1024);
        assert_eq!(config.sessions.max_sessions, 0);
        assert_eq!(config.sessions.sweep_interval_secs, 60);
    }
}
