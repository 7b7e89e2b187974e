//! Business logic for Parley.
//!
//! This crate defines the Model Client "port" (`LlmProvider`) that the
//! infrastructure layer implements, plus the conversation and session
//! registry logic that sits between the HTTP handlers and the model. It
//! depends only on `parley-types` -- never on `parley-infra` or any HTTP crate.

pub mod chat;
pub mod llm;
