//! Engine-level error taxonomy.
//!
//! Step failures are not errors at this level; they are recorded as failed
//! StepResults and folded into the run status. The error channel carries
//! only the cancellation signal and infrastructure failures.

use page_driver::PoolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Internal control signal: the execution was flagged for cancellation
    /// and the interpreter unwound at a step boundary. Converted by the
    /// entry point into a terminal "Execution cancelled" result, never
    /// surfaced to callers as an error kind.
    #[error("execution cancelled")]
    Cancelled,

    /// The session pool failed for a reason other than capacity.
    #[error(transparent)]
    Pool(#[from] PoolError),
}
