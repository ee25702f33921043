//! The chat session state machine.
//!
//! A session is Idle until `begin_submit` hands out a [`PendingExchange`],
//! then Awaiting until `finish` records the outcome. Only one exchange can
//! be outstanding; submits while Awaiting are ignored.

use std::sync::Arc;

use crate::ai::{BackendAdapter, ChatRequest};
use crate::error::BackendError;
use crate::prompt::{ERROR_REPLY, NO_REPLY_FALLBACK};
use crate::state::ChatMessage;

/// Outcome of one adapter call, as handed back to [`ChatSession::finish`].
pub type ExchangeOutcome = Result<Option<String>, BackendError>;

#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    transcript: Vec<ChatMessage>,
    pending_input: String,
    is_loading: bool,
    is_open: bool,
    context: Option<String>,
}

/// Owned snapshot of what one outbound request is built from.
#[derive(Debug, Clone)]
pub struct PendingExchange {
    transcript: Vec<ChatMessage>,
    context: Option<String>,
}

impl PendingExchange {
    pub fn request(&self) -> ChatRequest<'_> {
        ChatRequest::new(&self.transcript, self.context.as_deref())
    }

    /// Run the exchange against `adapter`, suitable for `tokio::spawn`.
    pub async fn dispatch(self, adapter: Arc<dyn BackendAdapter>) -> ExchangeOutcome {
        adapter.send(self.request()).await
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session whose transcript opens with an assistant greeting.
    pub fn with_greeting(greeting: &str) -> Self {
        Self {
            transcript: vec![ChatMessage::assistant(greeting)],
            ..Self::default()
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn toggle(&mut self) {
        self.is_open = !self.is_open;
    }

    pub fn update_input(&mut self, text: impl Into<String>) {
        self.pending_input = text.into();
    }

    pub fn set_context(&mut self, context: Option<String>) {
        self.context = context;
    }

    /// Whether `begin_submit` would start an exchange right now.
    pub fn can_submit(&self) -> bool {
        !self.is_loading && !self.pending_input.trim().is_empty()
    }

    /// Record the user turn and move to Awaiting.
    ///
    /// Returns `None` without touching any state when the input is blank or
    /// an exchange is already in flight.
    pub fn begin_submit(&mut self, adapter: &dyn BackendAdapter) -> Option<PendingExchange> {
        if !self.can_submit() {
            return None;
        }

        let content = adapter.prepare_user_input(&self.pending_input);
        self.transcript.push(ChatMessage::user(content));
        self.pending_input.clear();
        self.is_loading = true;

        tracing::debug!(
            backend = adapter.name(),
            turns = self.transcript.len(),
            has_context = self.context.is_some(),
            "starting chat exchange"
        );

        Some(PendingExchange {
            transcript: self.transcript.clone(),
            context: self.context.clone(),
        })
    }

    /// Record the outcome of the in-flight exchange and return to Idle.
    ///
    /// Appends exactly one assistant message and returns it. Returns `None`
    /// if no exchange was pending.
    pub fn finish(&mut self, outcome: ExchangeOutcome) -> Option<&ChatMessage> {
        if !self.is_loading {
            tracing::warn!("chat exchange finished while no request was pending; ignoring");
            return None;
        }

        let content = match outcome {
            Ok(Some(reply)) => {
                tracing::info!(chars = reply.len(), "chat reply received");
                reply
            }
            Ok(None) => {
                tracing::info!("backend response carried no usable reply");
                NO_REPLY_FALLBACK.to_string()
            }
            Err(e) => {
                tracing::error!(error = %e, "error sending chat message");
                ERROR_REPLY.to_string()
            }
        };

        self.transcript.push(ChatMessage::assistant(content));
        self.is_loading = false;
        self.transcript.last()
    }

    /// Submit the pending input and wait for the reply.
    ///
    /// Returns whether a request was issued.
    pub async fn submit(&mut self, adapter: &dyn BackendAdapter) -> bool {
        let Some(exchange) = self.begin_submit(adapter) else {
            return false;
        };
        let guard = ExchangeGuard { session: self };
        let outcome = adapter.send(exchange.request()).await;
        guard.session.finish(outcome);
        true
    }
}

/// Finishes the exchange with an error if the submit future is dropped
/// before the adapter resolves.
struct ExchangeGuard<'a> {
    session: &'a mut ChatSession,
}

impl Drop for ExchangeGuard<'_> {
    fn drop(&mut self) {
        if self.session.is_loading {
            self.session
                .finish(Err(BackendError::interrupted("submit cancelled before a reply arrived")));
        }
    }
}
