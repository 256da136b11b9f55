//! Cooperative cancellation registry.

use dashmap::DashSet;
use flowrunner_core_types::ExecutionId;
use tracing::debug;

/// Concurrency-safe set of executions flagged for early termination.
///
/// An external actor flags an id at any time; the interpreter polls the
/// flag at step boundaries only, so an action already in flight always runs
/// to its own completion or timeout. The owning execution clears its entry
/// during cleanup. Constructed once and injected wherever needed; there is
/// no process-global instance.
#[derive(Debug, Default)]
pub struct CancelRegistry {
    flagged: DashSet<ExecutionId>,
}

impl CancelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag an execution. Returns false when it was already flagged.
    pub fn request(&self, execution_id: ExecutionId) -> bool {
        debug!(execution = %execution_id, "cancellation requested");
        self.flagged.insert(execution_id)
    }

    pub fn is_cancelled(&self, execution_id: &ExecutionId) -> bool {
        self.flagged.contains(execution_id)
    }

    /// Remove the flag, if any. Idempotent.
    pub fn clear(&self, execution_id: &ExecutionId) -> bool {
        self.flagged.remove(execution_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.flagged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flagged.is_empty()
    }
}
