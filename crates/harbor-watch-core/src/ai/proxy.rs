use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{usable, BackendAdapter, ChatRequest};
use crate::error::BackendError;
use crate::prompt;

/// Body of `POST /api/chat`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProxyChatRequest {
    pub prompt: String,
}

/// Response of `POST /api/chat`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProxyChatResponse {
    #[serde(default)]
    pub reply: Option<String>,
}

/// Sends a single composite prompt to the same-origin `/api/chat` endpoint.
#[derive(Clone)]
pub struct ProxyAdapter {
    client: Client,
    endpoint: String,
}

impl ProxyAdapter {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl BackendAdapter for ProxyAdapter {
    fn name(&self) -> &str {
        "proxy"
    }

    async fn send(&self, request: ChatRequest<'_>) -> Result<Option<String>, BackendError> {
        let question = request.latest_user_text().unwrap_or_default();
        let body = ProxyChatRequest {
            prompt: prompt::composite_prompt(request.context, question),
        };

        let response = self.client.post(&self.endpoint).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(BackendError::status(status, text));
        }

        let text = response.text().await?;
        let parsed: ProxyChatResponse = serde_json::from_str(&text)?;
        Ok(usable(parsed.reply))
    }
}
