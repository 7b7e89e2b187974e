//! Model Client for OpenAI and OpenAI-compatible servers.
//!
//! Built on [`async_openai`]. The transcript is sent as a single
//! non-streaming chat completion; the first choice becomes the reply.

pub mod config;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
    CreateChatCompletionResponse, FinishReason,
};
use secrecy::{ExposeSecret, SecretString};

use parley_core::llm::provider::LlmProvider;
use parley_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, Message, MessageRole, StopReason, Usage,
};

use self::config::OpenAiCompatConfig;

/// Chat completions client for one base URL and credential.
///
/// Not `Debug`: the inner client holds the API key.
pub struct OpenAiCompatibleProvider {
    client: Client<OpenAIConfig>,
    provider_name: String,
    default_model: String,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: OpenAiCompatConfig) -> Self {
        let client = Client::with_config(
            OpenAIConfig::new()
                .with_api_base(&config.base_url)
                .with_api_key(config.api_key.expose_secret()),
        );

        Self {
            client,
            provider_name: config.provider_name,
            default_model: config.model,
        }
    }

    /// Client for api.openai.com.
    pub fn openai(api_key: SecretString, model: &str) -> Self {
        Self::new(config::openai_defaults(api_key, model))
    }

    fn to_wire_request(&self, request: &CompletionRequest) -> CreateChatCompletionRequest {
        let model = match request.model.as_str() {
            "" => self.default_model.clone(),
            name => name.to_string(),
        };

        let messages = request
            .system
            .iter()
            .map(|prompt| system_message(prompt))
            .chain(request.messages.iter().map(wire_message))
            .collect();

        CreateChatCompletionRequest {
            model,
            messages,
            max_completion_tokens: Some(request.max_tokens),
            temperature: request.temperature.map(|t| t as f32),
            ..Default::default()
        }
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let response = self
            .client
            .chat()
            .create(self.to_wire_request(request))
            .await
            .map_err(classify_error)?;

        Ok(from_wire_response(response))
    }
}

fn system_message(text: &str) -> ChatCompletionRequestMessage {
    ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
        content: ChatCompletionRequestSystemMessageContent::Text(text.to_string()),
        name: None,
    })
}

fn wire_message(message: &Message) -> ChatCompletionRequestMessage {
    let text = message.content.clone();
    match message.role {
        MessageRole::System => system_message(&text),
        MessageRole::User => {
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(text),
                name: None,
            })
        }
        #[allow(deprecated)]
        MessageRole::Assistant => {
            ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                content: Some(ChatCompletionRequestAssistantMessageContent::Text(text)),
                refusal: None,
                name: None,
                audio: None,
                tool_calls: None,
                function_call: None,
            })
        }
    }
}

/// Keep the first choice; a response with no choices yields an empty reply.
fn from_wire_response(response: CreateChatCompletionResponse) -> CompletionResponse {
    let (content, finish) = response
        .choices
        .into_iter()
        .next()
        .map(|choice| (choice.message.content.unwrap_or_default(), choice.finish_reason))
        .unwrap_or_default();

    let stop_reason = match finish {
        Some(FinishReason::Length) => StopReason::MaxTokens,
        Some(FinishReason::ContentFilter) => StopReason::ContentFilter,
        _ => StopReason::EndTurn,
    };

    let usage = response.usage.map_or_else(Usage::default, |u| Usage {
        input_tokens: u.prompt_tokens,
        output_tokens: u.completion_tokens,
    });

    CompletionResponse {
        id: response.id,
        content,
        model: response.model,
        stop_reason,
        usage,
    }
}

fn classify_error(err: OpenAIError) -> LlmError {
    match err {
        OpenAIError::ApiError(api) => classify_api_error(
            api.code.as_deref().unwrap_or_default(),
            api.r#type.as_deref().unwrap_or_default(),
            api.message,
        ),
        OpenAIError::Reqwest(ref http) => {
            let message = err.to_string();
            match http.status().map(|s| s.as_u16()) {
                Some(401) | Some(403) => LlmError::AuthenticationFailed(message),
                Some(429) => LlmError::RateLimited(message),
                Some(502..=504) | Some(529) => LlmError::Overloaded(message),
                _ => LlmError::Provider { message },
            }
        }
        OpenAIError::JSONDeserialize(_, body) => LlmError::Deserialization(body),
        OpenAIError::InvalidArgument(msg) => LlmError::InvalidRequest(msg),
        other => LlmError::Provider {
            message: other.to_string(),
        },
    }
}

/// Classify an API error body by its `code` and `type` fields.
fn classify_api_error(code: &str, kind: &str, message: String) -> LlmError {
    match (code, kind) {
        ("invalid_api_key", _) | (_, "authentication_error") => {
            LlmError::AuthenticationFailed(message)
        }
        ("rate_limit_exceeded" | "insufficient_quota", _) | (_, "rate_limit_error") => {
            LlmError::RateLimited(message)
        }
        ("context_length_exceeded", _) => LlmError::ContextLengthExceeded(message),
        ("server_error", _) | (_, "overloaded_error") => LlmError::Overloaded(message),
        _ if message.contains("Incorrect API key") => LlmError::AuthenticationFailed(message),
        _ => LlmError::Provider { message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_types::error::ChatError;

    fn provider() -> OpenAiCompatibleProvider {
        OpenAiCompatibleProvider::openai(SecretString::from("sk-test".to_string()), "gpt-3.5-turbo")
    }

    fn request(model: &str, system: Option<&str>) -> CompletionRequest {
        let msg = |role, content: &str| Message {
            role,
            content: content.to_string(),
        };
        CompletionRequest {
            model: model.to_string(),
            messages: vec![
                msg(MessageRole::User, "Hi"),
                msg(MessageRole::Assistant, "Hello!"),
                msg(MessageRole::User, "How are you?"),
            ],
            system: system.map(str::to_string),
            max_tokens: 256,
            temperature: Some(0.5),
        }
    }

    #[test]
    fn test_openai_factory() {
        let provider = provider();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.default_model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_wire_request_puts_system_prompt_first() {
        let wire = provider().to_wire_request(&request("gpt-4o", Some("Be kind.")));

        assert_eq!(wire.model, "gpt-4o");
        assert_eq!(wire.messages.len(), 4);
        assert!(matches!(wire.messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(wire.messages[1], ChatCompletionRequestMessage::User(_)));
        assert!(matches!(wire.messages[2], ChatCompletionRequestMessage::Assistant(_)));
        assert!(matches!(wire.messages[3], ChatCompletionRequestMessage::User(_)));
        assert_eq!(wire.max_completion_tokens, Some(256));
        assert_eq!(wire.temperature, Some(0.5));
    }

    #[test]
    fn test_wire_request_falls_back_to_default_model() {
        let wire = provider().to_wire_request(&request("", None));

        assert_eq!(wire.model, "gpt-3.5-turbo");
        assert_eq!(wire.messages.len(), 3);
        assert!(wire.stream.is_none());
    }

    #[test]
    fn test_classify_api_errors() {
        let classify = |code, kind, message: &str| classify_api_error(code, kind, message.to_string());

        assert!(matches!(
            classify("invalid_api_key", "", "bad key"),
            LlmError::AuthenticationFailed(ref m) if m == "bad key"
        ));
        assert!(matches!(
            classify("", "invalid_request_error", "Incorrect API key provided"),
            LlmError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            classify("", "rate_limit_error", "slow down"),
            LlmError::RateLimited(ref m) if m == "slow down"
        ));
        assert!(matches!(
            classify("context_length_exceeded", "", "too long"),
            LlmError::ContextLengthExceeded(ref m) if m == "too long"
        ));
        assert!(matches!(
            classify("", "", "something odd"),
            LlmError::Provider { ref message } if message == "something odd"
        ));
    }

    #[test]
    fn test_classify_invalid_argument() {
        let err = classify_error(OpenAIError::InvalidArgument("bad temperature".to_string()));
        assert!(matches!(err, LlmError::InvalidRequest(ref m) if m == "bad temperature"));
    }

    #[test]
    fn test_bad_credential_detail_keeps_provider_text() {
        let err = classify_api_error(
            "invalid_api_key",
            "invalid_request_error",
            "Incorrect API key provided: your-api-key-here".to_string(),
        );
        let ChatError::ModelUnavailable(detail) = ChatError::from(err);
        assert!(detail.contains("Incorrect API key provided: your-api-key-here"));
    }
}
