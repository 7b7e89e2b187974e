//! Chat service: the operations the HTTP layer calls.
//!
//! ChatService sits on top of the [`SessionRegistry`] and keeps handlers free
//! of registry details: send a message, read history, clear a session.

use std::sync::Arc;

use tracing::info;

use parley_types::chat::Turn;
use parley_types::error::ChatError;

use super::registry::SessionRegistry;

/// Orchestrates session lookup and conversation replies.
pub struct ChatService {
    registry: Arc<SessionRegistry>,
}

impl ChatService {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    /// Access the underlying registry (e.g. to start the idle sweeper).
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Send `message` in `session_id`, creating the session on first use.
    pub async fn chat(&self, session_id: &str, message: &str) -> Result<String, ChatError> {
        // Clone the Arc out of the map before awaiting the model.
        let conversation = self.registry.get_or_create(session_id);
        conversation.reply(message).await
    }

    /// Transcript for `session_id`; empty for a session that does not exist.
    pub fn history(&self, session_id: &str) -> Vec<Turn> {
        self.registry
            .get(session_id)
            .map(|conversation| conversation.history())
            .unwrap_or_default()
    }

    /// Drop `session_id`. Returns whether it existed.
    pub fn clear(&self, session_id: &str) -> bool {
        let removed = self.registry.remove(session_id);
        info!(session_id, removed, "Session clear requested");
        removed
    }

    pub fn session_count(&self) -> usize {
        self.registry.len()
    }
}
