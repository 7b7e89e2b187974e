//! Scripted provider shared by the unit tests in this crate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use parley_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, MessageRole, StopReason, Usage,
};

use super::provider::LlmProvider;

/// Replies `echo: <last user message>`, optionally after a delay or failing
/// the first `failures_left` calls. Every request it receives is recorded.
#[derive(Clone, Default)]
pub(crate) struct EchoProvider {
    pub delay: Option<Duration>,
    pub fail_with: Option<String>,
    pub failures_left: Arc<AtomicUsize>,
    pub seen: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl EchoProvider {
    pub fn delayed(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self::flaky(message, usize::MAX)
    }

    /// Fail the first `times` calls with `message`, then echo.
    pub fn flaky(message: &str, times: usize) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            failures_left: Arc::new(AtomicUsize::new(times)),
            ..Default::default()
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl LlmProvider for EchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.seen.lock().unwrap().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(ref message) = self.fail_with {
            let fail = self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if fail {
                return Err(LlmError::Provider {
                    message: message.clone(),
                });
            }
        }

        let last_user = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();

        Ok(CompletionResponse {
            id: format!("resp-{}", request.messages.len()),
            content: format!("echo: {last_user}"),
            model: request.model.clone(),
            stop_reason: StopReason::EndTurn,
            usage: Usage {
                input_tokens: 10,
                output_tokens: 5,
            },
        })
    }
}
