//! Flowrunner worker.
//!
//! HTTP surface over the flow execution engine: accept a normalized step
//! tree, run it against a pooled browser session, and stream per-step and
//! terminal outcomes to the caller's callback URL.

pub mod callbacks;
pub mod config;
pub mod metrics;
pub mod server;

pub use config::WorkerConfig;
pub use server::{build_router, AppState};
