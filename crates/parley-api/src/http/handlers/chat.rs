//! Chat HTTP handler.
//!
//! Endpoints:
//! - POST /chat - Send a message within a session and get the model's reply

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use parley_types::chat::DEFAULT_SESSION_ID;

use crate::http::error::AppError;
use crate::state::AppState;

/// Request body for POST /chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Omitted or null selects the shared `"default"` session.
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
    pub timestamp: String,
}

/// POST /chat - Reply to `message` in the requested session, creating it on
/// first use.
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let session_id = body
        .session_id
        .unwrap_or_else(|| DEFAULT_SESSION_ID.to_string());

    let response = state.chat_service.chat(&session_id, &body.message).await?;

    Ok(Json(ChatResponse {
        response,
        session_id,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
