//! Shared server state: the engine and its injected services.

use std::sync::Arc;

use action_registry::ActionRegistry;
use flow_engine::{CancelRegistry, FlowEngine};
use page_driver::SessionProvider;

use crate::callbacks::CallbackSender;
use crate::config::WorkerConfig;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<FlowEngine>,
    pub provider: Arc<dyn SessionProvider>,
    pub registry: Arc<ActionRegistry>,
    pub cancels: Arc<CancelRegistry>,
    pub callbacks: CallbackSender,
    pub worker_secret: Option<String>,
}

impl AppState {
    /// Wire the engine against a session provider. Production hands in the
    /// chromium pool; tests hand in mocks.
    pub fn new(config: &WorkerConfig, provider: Arc<dyn SessionProvider>) -> Self {
        let registry = Arc::new(ActionRegistry::builtin());
        let cancels = Arc::new(CancelRegistry::new());
        let engine = Arc::new(FlowEngine::new(
            Arc::clone(&provider),
            Arc::clone(&registry),
            Arc::clone(&cancels),
        ));

        let worker_secret = config
            .worker_secret
            .clone()
            .filter(|secret| !secret.is_empty());

        Self {
            engine,
            provider,
            registry,
            cancels,
            callbacks: CallbackSender::new(),
            worker_secret,
        }
    }
}
