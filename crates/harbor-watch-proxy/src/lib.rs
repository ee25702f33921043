//! The `/api/chat` proxy.
//!
//! Accepts a composite prompt from the dashboard, forwards it to the
//! inference provider with a credential that never leaves this process,
//! and returns `{reply}`.

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
