//! HTTP surface of the worker.

mod auth;
mod router;
mod state;

pub use router::build_router;
pub use state::AppState;
