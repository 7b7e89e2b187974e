//! Session history HTTP handlers.
//!
//! Endpoints:
//! - GET    /history/{session_id} - Transcript for a session
//! - DELETE /clear/{session_id}   - Drop a session and its transcript
//!
//! Unknown sessions are not errors: history is empty and clearing reports
//! that nothing was found.

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use parley_types::chat::Turn;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub messages: Vec<Turn>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// GET /history/{session_id}
pub async fn get_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        messages: state.chat_service.history(&session_id),
    })
}

/// DELETE /clear/{session_id}
pub async fn clear_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<MessageResponse> {
    let message = if state.chat_service.clear(&session_id) {
        format!("History cleared for session {session_id}")
    } else {
        format!("No history found for session {session_id}")
    };

    Json(MessageResponse { message })
}
