//! Discovery and health endpoints. Neither touches the registry or the
//! Model Client.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: [&'static str; 3],
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

/// GET / - API name, version and the chat endpoints.
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "AI Chatbot API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: ["/chat", "/history/{session_id}", "/clear/{session_id}"],
    })
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_is_always_healthy() {
        let Json(resp) = health_check().await;
        assert_eq!(resp.status, "healthy");
        assert!(chrono::DateTime::parse_from_rfc3339(&resp.timestamp).is_ok());
    }

    #[tokio::test]
    async fn test_root_lists_endpoints() {
        let Json(resp) = root().await;
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["message"], "AI Chatbot API");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(
            json["endpoints"],
            serde_json::json!(["/chat", "/history/{session_id}", "/clear/{session_id}"])
        );
    }
}
