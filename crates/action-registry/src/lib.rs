//! Builtin actions and their registration table.
//!
//! The action set is closed: every wire tag maps to an [`ActionKind`]
//! variant, and every primitive variant maps to exactly one registered
//! [`ActionHandler`]. Control tags (`loop`/`condition`) belong to the flow
//! engine and never reach a handler.

pub mod actions;
pub mod handler;
pub mod kind;
pub mod registry;

pub use handler::{ActionError, ActionHandler, ActionOutcome, VariableWrite};
pub use kind::ActionKind;
pub use registry::ActionRegistry;
