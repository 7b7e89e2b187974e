//! Conversations and the session registry that owns them.
//!
//! - `Conversation`: one session's transcript plus the reply loop
//! - `SessionRegistry`: session id -> conversation map with eviction
//! - `ChatService`: the operations the HTTP layer calls

pub mod conversation;
pub mod registry;
pub mod service;
