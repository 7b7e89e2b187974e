//! Scripted Model Client and state builders for handler tests.

use parley_core::llm::box_provider::BoxLlmProvider;
use parley_core::llm::provider::LlmProvider;
use parley_types::config::AppConfig;
use parley_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, MessageRole, StopReason, Usage,
};

use crate::state::AppState;

/// Replies "You said: <last user message>", or fails every call.
pub(crate) struct ScriptedProvider {
    fail: bool,
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        if self.fail {
            return Err(LlmError::AuthenticationFailed(
                "Incorrect API key provided: your-api-key-here".to_string(),
            ));
        }

        let last_user = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        Ok(CompletionResponse {
            id: "resp-test".to_string(),
            content: format!("You said: {last_user}"),
            model: request.model.clone(),
            stop_reason: StopReason::EndTurn,
            usage: Usage::default(),
        })
    }
}

pub(crate) fn test_state() -> AppState {
    AppState::with_provider(
        BoxLlmProvider::new(ScriptedProvider { fail: false }),
        &AppConfig::default(),
    )
}

pub(crate) fn failing_state() -> AppState {
    AppState::with_provider(
        BoxLlmProvider::new(ScriptedProvider { fail: true }),
        &AppConfig::default(),
    )
}
