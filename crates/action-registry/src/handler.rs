//! Action handler contract.

use async_trait::async_trait;
use page_driver::{DriverError, PageDriver};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

/// A variable written into the execution's store as a handler side effect.
/// The interpreter applies it; handlers never touch the store themselves.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableWrite {
    pub name: String,
    pub value: Value,
}

/// What a handler hands back to the interpreter.
#[derive(Clone, Debug)]
pub struct ActionOutcome {
    /// Step output recorded on the StepResult.
    pub output: Value,

    /// At most one variable write per step.
    pub variable: Option<VariableWrite>,

    /// Base64 PNG, surfaced as the StepResult's screenshot payload.
    pub screenshot: Option<String>,
}

impl ActionOutcome {
    pub fn new(output: Value) -> Self {
        Self {
            output,
            variable: None,
            screenshot: None,
        }
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: Value) -> Self {
        self.variable = Some(VariableWrite {
            name: name.into(),
            value,
        });
        self
    }

    pub fn with_screenshot(mut self, data: impl Into<String>) -> Self {
        self.screenshot = Some(data.into());
        self
    }
}

/// Failures surfaced by action dispatch and the handlers themselves.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Unknown action type: {0}")]
    UnknownAction(String),

    #[error("{action}: {reason}")]
    InvalidConfig {
        action: &'static str,
        reason: String,
    },

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("{action}: {message}")]
    Io {
        action: &'static str,
        message: String,
    },

    #[error("download failed: {0}")]
    Http(String),
}

impl ActionError {
    pub fn invalid_config(action: &'static str, reason: impl Into<String>) -> Self {
        ActionError::InvalidConfig {
            action,
            reason: reason.into(),
        }
    }

    pub fn io(action: &'static str, err: impl std::fmt::Display) -> Self {
        ActionError::Io {
            action,
            message: err.to_string(),
        }
    }
}

/// One primitive action: `(session, resolved config) -> outcome`.
///
/// Handlers signal failure through `Err`; they never mutate execution state
/// beyond the session they were given.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn run(
        &self,
        session: &dyn PageDriver,
        config: &Map<String, Value>,
    ) -> Result<ActionOutcome, ActionError>;
}

/// Deserialize a handler's typed config from the resolved step config.
pub(crate) fn parse_config<T: DeserializeOwned>(
    action: &'static str,
    config: &Map<String, Value>,
) -> Result<T, ActionError> {
    serde_json::from_value(Value::Object(config.clone()))
        .map_err(|err| ActionError::invalid_config(action, err.to_string()))
}
