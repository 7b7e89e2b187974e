//! Session registry: session id -> [`Conversation`].
//!
//! Backed by a `DashMap`, so creation and removal are serialized per key
//! while unrelated sessions never contend on a single lock. Conversations
//! are handed out as `Arc`s; callers await model replies without holding
//! any map guard.
//!
//! Growth is bounded two ways:
//! - a capacity limit that evicts the least recently active session when a
//!   new one would exceed it
//! - an idle TTL enforced by a periodic sweep

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use parley_types::config::SessionConfig;

use crate::llm::box_provider::BoxLlmProvider;

use super::conversation::{Conversation, GenerationSettings};

/// Bounds on how many sessions the registry keeps and for how long.
#[derive(Debug, Clone, Default)]
pub struct RegistryLimits {
    /// Zero means unbounded.
    pub max_sessions: usize,
    /// `None` disables idle expiry.
    pub idle_ttl: Option<Duration>,
}

impl RegistryLimits {
    /// Build limits from the `[sessions]` config section (0 disables either bound).
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            max_sessions: config.max_sessions,
            idle_ttl: (config.idle_ttl_secs > 0).then(|| Duration::from_secs(config.idle_ttl_secs)),
        }
    }
}

/// Owns every live conversation in the process.
pub struct SessionRegistry {
    sessions: DashMap<String, Arc<Conversation>>,
    provider: Arc<BoxLlmProvider>,
    settings: Arc<GenerationSettings>,
    limits: RegistryLimits,
}

impl SessionRegistry {
    pub fn new(
        provider: Arc<BoxLlmProvider>,
        settings: GenerationSettings,
        limits: RegistryLimits,
    ) -> Self {
        Self {
            sessions: DashMap::new(),
            provider,
            settings: Arc::new(settings),
            limits,
        }
    }

    /// Return the conversation for `session_id`, creating an empty one if absent.
    ///
    /// Two concurrent calls for the same unseen id observe the same conversation.
    pub fn get_or_create(&self, session_id: &str) -> Arc<Conversation> {
        if let Some(existing) = self.sessions.get(session_id) {
            let conversation = Arc::clone(existing.value());
            drop(existing);
            conversation.touch();
            return conversation;
        }

        let (conversation, created) = match self.sessions.entry(session_id.to_string()) {
            Entry::Occupied(entry) => (Arc::clone(entry.get()), false),
            Entry::Vacant(entry) => {
                let conversation = Arc::new(Conversation::new(
                    Arc::clone(&self.provider),
                    Arc::clone(&self.settings),
                ));
                entry.insert(Arc::clone(&conversation));
                (conversation, true)
            }
        };

        if created {
            debug!(session_id, sessions = self.sessions.len(), "Session created");
            self.enforce_capacity(session_id);
        } else {
            conversation.touch();
        }

        conversation
    }

    /// Non-creating lookup. Does not count as activity.
    pub fn get(&self, session_id: &str) -> Option<Arc<Conversation>> {
        self.sessions
            .get(session_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Remove the session entirely. Returns whether it existed.
    ///
    /// A reply already in flight for the session completes against the
    /// detached conversation; its turns are not visible afterwards.
    pub fn remove(&self, session_id: &str) -> bool {
        let removed = self.sessions.remove(session_id).is_some();
        if removed {
            debug!(session_id, "Session removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn limits(&self) -> &RegistryLimits {
        &self.limits
    }

    /// Drop every session whose last activity is older than the idle TTL.
    ///
    /// Returns the number of sessions removed (0 when no TTL is configured).
    pub fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        let Some(ttl) = self.limits.idle_ttl else {
            return 0;
        };
        let Ok(ttl) = chrono::Duration::from_std(ttl) else {
            return 0;
        };
        let cutoff = now - ttl;

        let mut evicted = 0;
        self.sessions.retain(|_, conversation| {
            let keep = conversation.last_active() >= cutoff;
            if !keep {
                evicted += 1;
            }
            keep
        });

        if evicted > 0 {
            info!(evicted, remaining = self.sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    /// Run [`Self::evict_idle`] every `period` until `cancel` fires.
    pub fn spawn_idle_sweeper(
        self: Arc<Self>,
        period: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("Idle session sweeper stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        self.evict_idle(Utc::now());
                    }
                }
            }
        })
    }

    /// Evict least recently active sessions (never `keep`) until within capacity.
    ///
    /// One scan frees the overflow or 1% of capacity, whichever is larger,
    /// so a full registry is rescanned once per batch of new sessions rather
    /// than on every insert.
    fn enforce_capacity(&self, keep: &str) {
        let max = self.limits.max_sessions;
        let len = self.sessions.len();
        if max == 0 || len <= max {
            return;
        }

        let mut candidates: Vec<(DateTime<Utc>, String)> = self
            .sessions
            .iter()
            .filter(|entry| entry.key() != keep)
            .map(|entry| (entry.value().last_active(), entry.key().clone()))
            .collect();

        let target = (len - max).max(max / 100).min(candidates.len());
        if target == 0 {
            return;
        }
        if target < candidates.len() {
            candidates.select_nth_unstable(target - 1);
        }

        let evicted = candidates
            .into_iter()
            .take(target)
            .filter(|(_, victim)| self.sessions.remove(victim).is_some())
            .count();

        info!(
            evicted,
            max_sessions = max,
            "Evicted least recently active sessions"
        );
    }
}
