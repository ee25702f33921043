use std::sync::Arc;

use harbor_watch_core::BackendAdapter;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Upstream adapter holding the inference credential.
    pub upstream: Arc<dyn BackendAdapter>,
}

impl AppState {
    pub fn new(upstream: Arc<dyn BackendAdapter>) -> Self {
        Self { upstream }
    }
}
