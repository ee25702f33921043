pub mod ai;
pub mod config;
pub mod error;
pub mod prompt;
pub mod provider;
pub mod session;
pub mod state;
pub mod telemetry;

// Re-export main types for convenience
pub use ai::{build_adapter, BackendAdapter, ChatRequest, DirectInferenceAdapter, ProxyAdapter};
pub use config::Config;
pub use error::BackendError;
pub use provider::BackendKind;
pub use session::{ChatSession, ExchangeOutcome, PendingExchange};
pub use state::{ChatMessage, ChatRole};
