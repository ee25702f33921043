use axum::routing::post;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the proxy router with request tracing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(handlers::chat))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
