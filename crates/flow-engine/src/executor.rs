//! Execution entry point and recursive step interpreter.

use std::collections::HashMap;
use std::sync::Arc;

use action_registry::{ActionError, ActionKind, ActionRegistry};
use async_recursion::async_recursion;
use chrono::Utc;
use flowrunner_core_types::{ExecutionId, ExecutionResult, FlowStep, RunStatus, StepResult};
use page_driver::{PageDriver, PoolError, SessionProvider};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::cancel::CancelRegistry;
use crate::errors::EngineError;
use crate::resolve::{resolve_config, stringify, Variables};

/// Fixed terminal error of a cancelled run.
pub const CANCELLED_ERROR: &str = "Execution cancelled";

const UNKNOWN_ERROR: &str = "Unknown error";
const DEFAULT_ITEM_VARIABLE: &str = "item";
const DEFAULT_INDEX_VARIABLE: &str = "index";

/// Progress callback, invoked once per recorded StepResult.
pub type StepCallback = Arc<dyn Fn(&StepResult) + Send + Sync>;

/// Outcome of interpreting a control (loop/condition) step.
enum ControlOutcome {
    /// The nested body ran; its own results carry any failure.
    Ran(RunStatus),

    /// The control step itself is unusable; there is no child result to
    /// report through, so the step gets its own failed StepResult.
    Misconfigured(String),
}

/// The flow execution engine: one instance serves every run.
pub struct FlowEngine {
    pool: Arc<dyn SessionProvider>,
    registry: Arc<ActionRegistry>,
    cancels: Arc<CancelRegistry>,
}

impl FlowEngine {
    pub fn new(
        pool: Arc<dyn SessionProvider>,
        registry: Arc<ActionRegistry>,
        cancels: Arc<CancelRegistry>,
    ) -> Self {
        Self {
            pool,
            registry,
            cancels,
        }
    }

    pub fn cancel_registry(&self) -> Arc<CancelRegistry> {
        Arc::clone(&self.cancels)
    }

    /// Run a normalized step tree to its terminal result.
    ///
    /// Pool exhaustion is a failed result with zero steps. Cancellation is a
    /// failed result with the fixed [`CANCELLED_ERROR`] message. The session
    /// and the cancellation flag are released on every path; errors other
    /// than the cancellation signal propagate to the caller after cleanup.
    pub async fn execute(
        &self,
        execution_id: ExecutionId,
        steps: &[FlowStep],
        on_step: Option<StepCallback>,
    ) -> Result<ExecutionResult, EngineError> {
        info!(execution = %execution_id, steps = steps.len(), "starting flow execution");

        let session = match self.pool.acquire(&execution_id).await {
            Ok(session) => session,
            Err(err @ PoolError::Exhausted { .. }) => {
                warn!(execution = %execution_id, %err, "rejecting run, pool at capacity");
                self.cancels.clear(&execution_id);
                return Ok(ExecutionResult::failed(
                    execution_id,
                    Vec::new(),
                    err.to_string(),
                ));
            }
            Err(err) => {
                self.cancels.clear(&execution_id);
                return Err(err.into());
            }
        };

        let mut variables: Variables = HashMap::new();
        let mut results: Vec<StepResult> = Vec::new();
        let run = self
            .run_steps(
                steps,
                session.as_ref(),
                &mut variables,
                &mut results,
                &execution_id,
                on_step.as_ref(),
            )
            .await;
        drop(session);

        // Unconditional cleanup, before the outcome is even interpreted.
        self.pool.release(&execution_id).await;
        self.cancels.clear(&execution_id);

        match run {
            Ok(RunStatus::Completed) => {
                info!(execution = %execution_id, steps = results.len(), "flow completed");
                Ok(ExecutionResult::completed(execution_id, results))
            }
            Ok(RunStatus::Failed) => {
                let error = results
                    .last()
                    .and_then(|result| result.error.clone())
                    .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
                warn!(execution = %execution_id, %error, "flow failed");
                Ok(ExecutionResult::failed(execution_id, results, error))
            }
            Err(EngineError::Cancelled) => {
                info!(execution = %execution_id, steps = results.len(), "flow cancelled");
                Ok(ExecutionResult::failed(execution_id, results, CANCELLED_ERROR))
            }
            Err(err) => Err(err),
        }
    }

    /// Interpret one step sequence. Recursion re-enters here for loop bodies
    /// and condition branches; the cancellation checkpoint therefore fires
    /// at every nesting depth.
    #[async_recursion]
    async fn run_steps(
        &self,
        steps: &[FlowStep],
        session: &dyn PageDriver,
        variables: &mut Variables,
        results: &mut Vec<StepResult>,
        execution_id: &ExecutionId,
        on_step: Option<&StepCallback>,
    ) -> Result<RunStatus, EngineError> {
        for step in steps {
            if self.cancels.is_cancelled(execution_id) {
                debug!(execution = %execution_id, step = %step.id, "cancellation observed");
                return Err(EngineError::Cancelled);
            }

            let started_at = Utc::now();
            let resolved = resolve_config(&step.config, variables);
            let kind = ActionKind::parse(&step.action_type);

            if matches!(kind, Some(k) if k.is_control()) {
                let outcome = match kind {
                    Some(ActionKind::Loop) => {
                        self.run_loop(step, &resolved, session, variables, results, execution_id, on_step)
                            .await?
                    }
                    _ => {
                        self.run_condition(step, &resolved, session, variables, results, execution_id, on_step)
                            .await?
                    }
                };
                match outcome {
                    ControlOutcome::Ran(RunStatus::Completed) => continue,
                    ControlOutcome::Ran(RunStatus::Failed) => return Ok(RunStatus::Failed),
                    ControlOutcome::Misconfigured(reason) => {
                        warn!(execution = %execution_id, step = %step.id, %reason, "control step misconfigured");
                        self.record(results, on_step, StepResult::failed(step, reason, started_at));
                        return Ok(RunStatus::Failed);
                    }
                }
            }

            let dispatch = match kind.and_then(|k| self.registry.get(k)) {
                Some(handler) => handler.run(session, &resolved).await,
                None => Err(ActionError::UnknownAction(step.action_type.clone())),
            };

            match dispatch {
                Ok(outcome) => {
                    // Variable writes are applied here, never by handlers.
                    if let Some(write) = outcome.variable {
                        variables.insert(write.name, write.value);
                    }
                    self.record(
                        results,
                        on_step,
                        StepResult::completed(step, outcome.output, outcome.screenshot, started_at),
                    );
                }
                Err(err) => {
                    warn!(execution = %execution_id, step = %step.id, %err, "step failed");
                    self.record(results, on_step, StepResult::failed(step, err.to_string(), started_at));
                    return Ok(RunStatus::Failed);
                }
            }
        }
        Ok(RunStatus::Completed)
    }

    /// Loop dispatch. Array mode wins when `items` names a variable present
    /// in the store; count mode otherwise. Any body failure aborts the
    /// entire loop with no per-iteration isolation.
    #[allow(clippy::too_many_arguments)]
    async fn run_loop(
        &self,
        step: &FlowStep,
        resolved: &Map<String, Value>,
        session: &dyn PageDriver,
        variables: &mut Variables,
        results: &mut Vec<StepResult>,
        execution_id: &ExecutionId,
        on_step: Option<&StepCallback>,
    ) -> Result<ControlOutcome, EngineError> {
        let body = &step.children;

        if let Some(Value::String(items)) = resolved.get("items") {
            if let Some(source) = variables.get(items.as_str()) {
                let Some(array) = source.as_array().cloned() else {
                    return Ok(ControlOutcome::Misconfigured(format!(
                        "loop: variable \"{items}\" is not an array"
                    )));
                };
                let item_variable = resolved
                    .get("itemVariable")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_ITEM_VARIABLE)
                    .to_string();

                debug!(execution = %execution_id, step = %step.id, items = array.len(), "array loop");
                for item in array {
                    variables.insert(item_variable.clone(), item);
                    let status = self
                        .run_steps(body, session, variables, results, execution_id, on_step)
                        .await?;
                    if status == RunStatus::Failed {
                        return Ok(ControlOutcome::Ran(RunStatus::Failed));
                    }
                }
                return Ok(ControlOutcome::Ran(RunStatus::Completed));
            }
        }

        if let Some(count_value) = resolved.get("count") {
            let Some(count) = coerce_count(count_value) else {
                return Ok(ControlOutcome::Misconfigured(
                    "loop: count must be numeric".to_string(),
                ));
            };
            let index_variable = resolved
                .get("indexVariable")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_INDEX_VARIABLE)
                .to_string();

            debug!(execution = %execution_id, step = %step.id, count, "count loop");
            for index in 0..count {
                variables.insert(index_variable.clone(), Value::from(index));
                let status = self
                    .run_steps(body, session, variables, results, execution_id, on_step)
                    .await?;
                if status == RunStatus::Failed {
                    return Ok(ControlOutcome::Ran(RunStatus::Failed));
                }
            }
            return Ok(ControlOutcome::Ran(RunStatus::Completed));
        }

        Ok(ControlOutcome::Misconfigured(
            "loop: either 'items' or 'count' is required".to_string(),
        ))
    }

    /// Condition dispatch: compare a store variable against a literal, then
    /// run the then- or else-branch.
    #[allow(clippy::too_many_arguments)]
    async fn run_condition(
        &self,
        step: &FlowStep,
        resolved: &Map<String, Value>,
        session: &dyn PageDriver,
        variables: &mut Variables,
        results: &mut Vec<StepResult>,
        execution_id: &ExecutionId,
        on_step: Option<&StepCallback>,
    ) -> Result<ControlOutcome, EngineError> {
        let Some(variable) = resolved.get("variable").and_then(Value::as_str) else {
            return Ok(ControlOutcome::Misconfigured(
                "condition: 'variable' is required".to_string(),
            ));
        };
        let Some(operator) = resolved.get("operator").and_then(Value::as_str) else {
            return Ok(ControlOutcome::Misconfigured(
                "condition: 'operator' is required".to_string(),
            ));
        };
        let expected = resolved.get("value").cloned().unwrap_or(Value::Null);
        let actual = variables.get(variable).cloned();

        let met = match operator {
            "==" => loose_eq(actual.as_ref(), &expected),
            "!=" => !loose_eq(actual.as_ref(), &expected),
            ">" | "<" | ">=" | "<=" => compare_ordering(operator, actual.as_ref(), &expected),
            "contains" => actual
                .as_ref()
                .and_then(Value::as_str)
                .map(|s| s.contains(&stringify(&expected)))
                .unwrap_or(false),
            other => {
                return Ok(ControlOutcome::Misconfigured(format!(
                    "condition: unknown operator \"{other}\""
                )))
            }
        };

        debug!(execution = %execution_id, step = %step.id, variable, operator, met, "condition evaluated");
        let branch = if met { &step.children } else { &step.else_children };
        let status = self
            .run_steps(branch, session, variables, results, execution_id, on_step)
            .await?;
        Ok(ControlOutcome::Ran(status))
    }

    fn record(
        &self,
        results: &mut Vec<StepResult>,
        on_step: Option<&StepCallback>,
        result: StepResult,
    ) {
        results.push(result);
        if let (Some(callback), Some(last)) = (on_step, results.last()) {
            callback(last);
        }
    }
}

/// Loose scalar equality: exact value equality first, then numeric
/// coercion unless both sides are strings. A missing variable equals only
/// an explicit null.
fn loose_eq(actual: Option<&Value>, expected: &Value) -> bool {
    let Some(actual) = actual else {
        return expected.is_null();
    };
    if actual == expected {
        return true;
    }
    if actual.is_string() && expected.is_string() {
        return false;
    }
    match (coerce_number(actual), coerce_number(expected)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Ordering comparison under numeric coercion; false whenever either side
/// does not coerce.
fn compare_ordering(operator: &str, actual: Option<&Value>, expected: &Value) -> bool {
    let (Some(a), Some(b)) = (actual.and_then(coerce_number), coerce_number(expected)) else {
        return false;
    };
    match operator {
        ">" => a > b,
        "<" => a < b,
        ">=" => a >= b,
        "<=" => a <= b,
        _ => false,
    }
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        _ => None,
    }
}

/// Numeric loop count: negative counts run zero iterations, non-numeric
/// values are a misconfiguration.
fn coerce_count(value: &Value) -> Option<u64> {
    let n = coerce_number(value)?;
    if !n.is_finite() {
        return None;
    }
    Some(n.max(0.0) as u64)
}
