//! `POST /api/llm/chat`

use axum::{extract::rejection::JsonRejection, extract::State, response::Json};
use serde_json::Value;

use crate::backend::error::BackendError;
use crate::backend::llm::client::{ChatRequest, LlmClient};
use crate::backend::middleware::AuthUser;

pub async fn chat(
    State(llm): State<LlmClient>,
    AuthUser(user): AuthUser,
    request: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<Value>, BackendError> {
    let Json(request) = request?;
    tracing::debug!(
        user_id = %user.id,
        messages = request.messages.len(),
        "Forwarding chat request"
    );
    Ok(Json(llm.chat(request).await?))
}
