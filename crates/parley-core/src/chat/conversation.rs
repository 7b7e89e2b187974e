//! A single session's conversation.
//!
//! `Conversation` owns an append-only transcript and produces the next
//! assistant reply by sending the whole transcript to the Model Client.
//!
//! Locking:
//! - `reply_lock` (async) is held for the full reply, including the model
//!   call, so one session has at most one generation in flight.
//! - `transcript` (sync) is only held for push/clone and never across an
//!   `.await`, so `history()` is never blocked by a slow model.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{Instrument, debug, info_span, warn};

use parley_types::chat::Turn;
use parley_types::config::ModelConfig;
use parley_types::error::ChatError;
use parley_types::llm::{CompletionRequest, LlmError, Message};

use crate::llm::box_provider::BoxLlmProvider;

/// Model parameters applied to every reply in every session.
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Prepended as the system message; `None` sends the transcript alone.
    pub system_prompt: Option<String>,
    /// Upper bound on one model call; `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
            max_tokens: 1024,
            system_prompt: None,
            request_timeout: Some(Duration::from_secs(60)),
        }
    }
}

impl GenerationSettings {
    /// Build settings from the `[model]` config section. An empty system
    /// prompt means none is sent; a zero timeout means no timeout.
    pub fn from_config(config: &ModelConfig) -> Self {
        let system_prompt = Some(config.system_prompt.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            system_prompt,
            request_timeout: (config.request_timeout_secs > 0)
                .then(|| Duration::from_secs(config.request_timeout_secs)),
        }
    }
}

/// One session's transcript plus the handle used to extend it.
pub struct Conversation {
    provider: Arc<BoxLlmProvider>,
    settings: Arc<GenerationSettings>,
    transcript: Mutex<Vec<Turn>>,
    reply_lock: AsyncMutex<()>,
    created_at: DateTime<Utc>,
    /// Unix millis of the last chat activity; read by registry eviction.
    last_active_ms: AtomicI64,
}

impl Conversation {
    /// Create an empty conversation.
    pub fn new(provider: Arc<BoxLlmProvider>, settings: Arc<GenerationSettings>) -> Self {
        let now = Utc::now();
        Self {
            provider,
            settings,
            transcript: Mutex::new(Vec::new()),
            reply_lock: AsyncMutex::new(()),
            created_at: now,
            last_active_ms: AtomicI64::new(now.timestamp_millis()),
        }
    }

    /// Append `user_text`, ask the model for the next turn, append and return it.
    ///
    /// Calls on the same conversation are serialized: the second caller waits
    /// until the first has appended its assistant turn.
    ///
    /// On failure the user turn stays in the transcript with no assistant turn
    /// after it; the next successful call sends it to the model as context.
    pub async fn reply(&self, user_text: &str) -> Result<String, ChatError> {
        let _in_flight = self.reply_lock.lock().await;
        self.touch();

        let request = {
            let mut transcript = self.transcript();
            transcript.push(Turn::user(user_text));
            self.build_request(&transcript)
        };

        let span = info_span!(
            "gen_ai.chat",
            gen_ai.operation.name = "chat",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
            turns = request.messages.len(),
        );

        let call = self.provider.complete(&request).instrument(span);
        let result = match self.settings.request_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or_else(|_| Err(LlmError::Timeout(limit.as_secs()))),
            None => call.await,
        };

        let response = result.map_err(|e| {
            warn!(provider = self.provider.name(), error = %e, "Model call failed");
            ChatError::from(e)
        })?;

        debug!(
            response_id = %response.id,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            stop_reason = %response.stop_reason,
            "Model reply received"
        );

        self.transcript()
            .push(Turn::assistant(response.content.clone()));
        self.touch();

        Ok(response.content)
    }

    /// Snapshot of the transcript in chronological order.
    pub fn history(&self) -> Vec<Turn> {
        self.transcript().clone()
    }

    /// Number of turns recorded so far.
    pub fn len(&self) -> usize {
        self.transcript().len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcript().is_empty()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time of the most recent chat activity on this conversation.
    pub fn last_active(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.last_active_ms.load(Ordering::Relaxed))
            .unwrap_or(self.created_at)
    }

    /// Mark the conversation as used now.
    pub fn touch(&self) {
        self.touch_at(Utc::now());
    }

    pub(crate) fn touch_at(&self, at: DateTime<Utc>) {
        self.last_active_ms
            .store(at.timestamp_millis(), Ordering::Relaxed);
    }

    fn build_request(&self, transcript: &[Turn]) -> CompletionRequest {
        CompletionRequest {
            model: self.settings.model.clone(),
            messages: transcript.iter().map(Message::from).collect(),
            system: self.settings.system_prompt.clone(),
            max_tokens: self.settings.max_tokens,
            temperature: Some(self.settings.temperature),
        }
    }

    // A panic while holding the lock cannot leave a half-pushed Vec, so a
    // poisoned transcript is still consistent.
    fn transcript(&self) -> MutexGuard<'_, Vec<Turn>> {
        self.transcript
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
