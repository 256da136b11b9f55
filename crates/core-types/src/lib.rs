//! Shared primitives for the flowrunner worker crates.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Identifier of one flow execution. Supplied by the calling system and
/// treated as opaque; minted locally only in tests and tooling.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ExecutionId(pub String);

impl ExecutionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ExecutionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExecutionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ExecutionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One node of a normalized flow: either a primitive action or a control
/// construct (`loop`/`condition`) whose nested bodies arrive pre-expressed
/// as `children`/`elseChildren`, never as graph edges.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowStep {
    /// Step identifier, unique within one flow.
    pub id: String,

    /// Wire tag naming the action (`navigate`, `click`, ..., `loop`, `condition`).
    pub action_type: String,

    /// Action configuration; string values may carry `{{variable}}` templates.
    #[serde(default)]
    pub config: serde_json::Map<String, Value>,

    /// Loop body, or condition then-branch.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FlowStep>,

    /// Condition else-branch.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub else_children: Vec<FlowStep>,
}

impl FlowStep {
    pub fn new(id: impl Into<String>, action_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            action_type: action_type.into(),
            config: serde_json::Map::new(),
            children: Vec::new(),
            else_children: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: serde_json::Map<String, Value>) -> Self {
        self.config = config;
        self
    }

    pub fn with_children(mut self, children: Vec<FlowStep>) -> Self {
        self.children = children;
        self
    }

    pub fn with_else_children(mut self, else_children: Vec<FlowStep>) -> Self {
        self.else_children = else_children;
        self
    }
}

/// Terminal status shared by steps and whole runs.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Completed,
    Failed,
}

impl RunStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunStatus::Completed)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Completed => f.write_str("completed"),
            RunStatus::Failed => f.write_str("failed"),
        }
    }
}

/// Outcome of one primitive step. Immutable once appended to a run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub step_id: String,
    pub action_type: String,
    pub status: RunStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Base64 PNG payload, present for screenshot steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_data: Option<String>,

    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl StepResult {
    pub fn completed(
        step: &FlowStep,
        output: Value,
        screenshot_data: Option<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            step_id: step.id.clone(),
            action_type: step.action_type.clone(),
            status: RunStatus::Completed,
            output: Some(output),
            error: None,
            screenshot_data,
            started_at,
            completed_at: Utc::now(),
        }
    }

    pub fn failed(step: &FlowStep, error: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            step_id: step.id.clone(),
            action_type: step.action_type.clone(),
            status: RunStatus::Failed,
            output: None,
            error: Some(error.into()),
            screenshot_data: None,
            started_at,
            completed_at: Utc::now(),
        }
    }
}

/// Terminal record of one run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub execution_id: ExecutionId,
    pub status: RunStatus,
    pub steps: Vec<StepResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn completed(execution_id: ExecutionId, steps: Vec<StepResult>) -> Self {
        Self {
            execution_id,
            status: RunStatus::Completed,
            steps,
            error: None,
        }
    }

    pub fn failed(
        execution_id: ExecutionId,
        steps: Vec<StepResult>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            execution_id,
            status: RunStatus::Failed,
            steps,
            error: Some(error.into()),
        }
    }
}

/// Events delivered fire-and-forget to the caller's callback URL.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallbackEvent {
    #[serde(rename_all = "camelCase")]
    StepComplete {
        execution_id: ExecutionId,
        step: StepResult,
    },

    #[serde(rename_all = "camelCase")]
    ExecutionComplete {
        execution_id: ExecutionId,
        status: RunStatus,
        steps: Vec<StepResult>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl CallbackEvent {
    pub fn step_complete(execution_id: ExecutionId, step: StepResult) -> Self {
        CallbackEvent::StepComplete { execution_id, step }
    }

    pub fn execution_complete(result: ExecutionResult) -> Self {
        CallbackEvent::ExecutionComplete {
            execution_id: result.execution_id,
            status: result.status,
            steps: result.steps,
            error: result.error,
        }
    }
}
