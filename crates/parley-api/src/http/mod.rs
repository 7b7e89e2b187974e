//! HTTP API layer for Parley.
//!
//! Axum routes for chatting within a session, reading and clearing a
//! session's history, plus health and discovery endpoints.

pub mod error;
pub mod handlers;
pub mod router;

#[cfg(test)]
pub(crate) mod test_support;
