//! Chat completion client

use std::sync::Arc;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::error::BackendError;
use crate::backend::server::config::LlmConfig;
use crate::shared::SharedError;

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 512;

/// Body of `POST /api/llm/chat`
///
/// `messages` are forwarded as given; their shape is the upstream's concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub messages: Vec<Value>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

/// Request sent upstream, with every default resolved
#[derive(Debug, Serialize)]
struct UpstreamRequest<'a> {
    model: &'a str,
    messages: &'a [Value],
    temperature: f64,
    max_tokens: u32,
}

/// Upstream chat completion client
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    config: Arc<LlmConfig>,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    /// Forward a chat request and return the upstream JSON verbatim
    pub async fn chat(&self, request: ChatRequest) -> Result<Value, BackendError> {
        if request.messages.is_empty() {
            return Err(SharedError::validation("messages", "At least one message is required").into());
        }
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| BackendError::upstream("LLM API key is not configured"))?;

        let model = request
            .model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(&self.config.default_model);
        let body = UpstreamRequest {
            model,
            messages: &request.messages,
            temperature: request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("LLM upstream unreachable: {}", e);
                BackendError::upstream(format!("LLM API request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| status.to_string());
            tracing::warn!(status = %status, "LLM upstream returned an error");
            return Err(BackendError::upstream(format!(
                "LLM API error: {} - {}",
                status.as_u16(),
                error_text
            )));
        }

        response.json::<Value>().await.map_err(|e| {
            BackendError::upstream(format!("Failed to parse LLM API response: {}", e))
        })
    }
}
