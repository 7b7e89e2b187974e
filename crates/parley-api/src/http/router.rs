//! Axum router configuration with middleware.
//!
//! Middleware: permissive CORS and HTTP request tracing.

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::system::root))
        .route("/health", get(handlers::system::health_check))
        .route("/chat", post(handlers::chat::chat))
        .route(
            "/history/{session_id}",
            get(handlers::history::get_history),
        )
        .route(
            "/clear/{session_id}",
            delete(handlers::history::clear_history),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
