use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{usable, BackendAdapter, ChatRequest};
use crate::error::BackendError;
use crate::prompt;

pub const DEFAULT_INFERENCE_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";
pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: u32 = 150;

#[derive(Serialize)]
struct InferenceMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    model: &'a str,
    messages: Vec<InferenceMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct InferenceResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct InferenceChoice {
    #[serde(default)]
    message: Option<InferenceResponseMessage>,
}

#[derive(Deserialize)]
struct InferenceResponse {
    #[serde(default)]
    choices: Vec<InferenceChoice>,
}

/// Talks to an OpenAI-compatible chat completions endpoint directly.
///
/// Holds the bearer credential, so it belongs on the server side of the
/// proxy rather than in anything the operator's client can inspect.
#[derive(Clone)]
pub struct DirectInferenceAdapter {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl DirectInferenceAdapter {
    pub fn new(endpoint: &str, api_key: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl BackendAdapter for DirectInferenceAdapter {
    fn name(&self) -> &str {
        "direct"
    }

    fn prepare_user_input(&self, input: &str) -> String {
        prompt::with_word_limit(input)
    }

    async fn send(&self, request: ChatRequest<'_>) -> Result<Option<String>, BackendError> {
        let system = request
            .context
            .filter(|c| !c.trim().is_empty())
            .map(prompt::context_system_message);

        let mut messages = Vec::with_capacity(request.transcript.len() + 1);
        if let Some(system) = system.as_deref() {
            messages.push(InferenceMessage {
                role: "system",
                content: system,
            });
        }
        messages.extend(request.transcript.iter().map(|m| InferenceMessage {
            role: m.role.as_str(),
            content: &m.content,
        }));

        let body = InferenceRequest {
            model: &self.model,
            messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(BackendError::status(status, text));
        }

        let text = response.text().await?;
        let parsed: InferenceResponse = serde_json::from_str(&text)?;
        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content);

        Ok(usable(reply))
    }
}
