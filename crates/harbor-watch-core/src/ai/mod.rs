pub mod direct;
pub mod proxy;

use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use crate::config::Config;
use crate::error::BackendError;
use crate::provider::BackendKind;
use crate::state::{ChatMessage, ChatRole};

pub use direct::DirectInferenceAdapter;
pub use proxy::ProxyAdapter;

/// Everything an adapter needs to build one outbound request.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub transcript: &'a [ChatMessage],
    pub context: Option<&'a str>,
}

impl<'a> ChatRequest<'a> {
    pub fn new(transcript: &'a [ChatMessage], context: Option<&'a str>) -> Self {
        Self { transcript, context }
    }

    /// Text of the most recent user turn, if any
    pub fn latest_user_text(&self) -> Option<&'a str> {
        self.transcript
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::User)
            .map(|m| m.content.as_str())
    }
}

/// A chat backend: turns a transcript into one network call and pulls a
/// reply out of the response.
///
/// `Ok(None)` means the backend answered without a usable reply.
#[async_trait]
pub trait BackendAdapter: Send + Sync {
    fn name(&self) -> &str;

    /// Shapes raw user input into the content of the user turn.
    fn prepare_user_input(&self, input: &str) -> String {
        input.to_string()
    }

    async fn send(&self, request: ChatRequest<'_>) -> Result<Option<String>, BackendError>;
}

/// Build the adapter selected by `config`.
pub fn build_adapter(config: &Config) -> Result<Arc<dyn BackendAdapter>> {
    match config.backend_kind()? {
        BackendKind::Proxy => Ok(Arc::new(ProxyAdapter::new(config.proxy_url()))),
        BackendKind::Direct => {
            let api_key = config.api_key().ok_or_else(|| {
                anyhow!(
                    "Direct backend needs an API key. \
                     Set HARBOR_WATCH_API_KEY or api_key in config.json"
                )
            })?;
            Ok(Arc::new(DirectInferenceAdapter::new(
                config.inference_url(),
                &api_key,
                config.model(),
            )))
        }
    }
}

/// Empty strings count as no reply.
pub(crate) fn usable(reply: Option<String>) -> Option<String> {
    reply.filter(|r| !r.trim().is_empty())
}
