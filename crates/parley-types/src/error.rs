use thiserror::Error;

use crate::llm::LlmError;

/// Errors surfaced by a conversation reply.
///
/// An unknown session is never an error: history and clear treat it as
/// empty state.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
}

impl From<LlmError> for ChatError {
    fn from(e: LlmError) -> Self {
        ChatError::ModelUnavailable(e.to_string())
    }
}
