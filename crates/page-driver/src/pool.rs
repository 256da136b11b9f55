//! Session pool contract.

use std::sync::Arc;

use async_trait::async_trait;
use flowrunner_core_types::ExecutionId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::PageDriver;

/// Fixed parameters of the pooled browser host and its sessions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoolSettings {
    /// Hard bound on concurrently active sessions; acquisition beyond it
    /// fails immediately, it never queues.
    pub capacity: usize,

    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub user_agent: String,

    /// Explicit chromium binary; discovered on PATH when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chrome_executable: Option<std::path::PathBuf>,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            capacity: 3,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            user_agent: concat!(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 ",
                "(KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36"
            )
            .to_string(),
            chrome_executable: None,
        }
    }
}

/// Diagnostic snapshot reported on the health endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStatus {
    pub active_sessions: usize,
    pub max_sessions: usize,
    pub browser_connected: bool,
}

/// Failures raised while acquiring or managing sessions.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Capacity reached: rejected synchronously, no session was created.
    #[error("max concurrent sessions ({capacity}) reached")]
    Exhausted { capacity: usize },

    /// A session is already registered for this execution; sessions are
    /// exclusive and never shared.
    #[error("session already active for execution {0}")]
    AlreadyActive(ExecutionId),

    /// The shared browser host could not be launched or reached.
    #[error("browser host unavailable: {0}")]
    Host(String),

    /// A fresh session could not be opened on a healthy host.
    #[error("failed to open session: {0}")]
    Session(String),
}

/// Capacity-bounded source of isolated sessions, keyed by execution id.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Open a fresh isolated session for `execution_id`, failing fast when
    /// the pool is at capacity.
    async fn acquire(&self, execution_id: &ExecutionId)
        -> Result<Arc<dyn PageDriver>, PoolError>;

    /// Close and deregister the session, if any. Idempotent; close failures
    /// are swallowed.
    async fn release(&self, execution_id: &ExecutionId);

    /// Diagnostic counts and host health.
    async fn status(&self) -> PoolStatus;
}
