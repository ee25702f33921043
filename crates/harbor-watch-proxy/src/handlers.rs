use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use harbor_watch_core::ai::proxy::{ProxyChatRequest, ProxyChatResponse};
use harbor_watch_core::{ChatMessage, ChatRequest};

use crate::error::AppError;
use crate::state::AppState;

/// POST /api/chat - forward one composite prompt upstream.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ProxyChatRequest>, JsonRejection>,
) -> Result<Json<ProxyChatResponse>, AppError> {
    let Json(body) = payload?;
    if body.prompt.trim().is_empty() {
        return Err(AppError::Validation("prompt must not be empty".to_string()));
    }

    tracing::debug!(chars = body.prompt.len(), "forwarding chat prompt");

    let transcript = [ChatMessage::user(body.prompt)];
    let reply = state
        .upstream
        .send(ChatRequest::new(&transcript, None))
        .await?;

    tracing::info!(has_reply = reply.is_some(), "chat prompt answered");
    Ok(Json(ProxyChatResponse { reply }))
}
