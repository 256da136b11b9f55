use async_trait::async_trait;
use page_driver::PageDriver;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::handler::{parse_config, ActionError, ActionHandler, ActionOutcome};

#[derive(Deserialize)]
struct SetVariableConfig {
    name: String,
    #[serde(default)]
    value: Value,
}

/// Seed or overwrite an execution variable. Uses no browser at all; the
/// write itself is applied by the interpreter.
pub struct SetVariableAction;

#[async_trait]
impl ActionHandler for SetVariableAction {
    async fn run(
        &self,
        _session: &dyn PageDriver,
        config: &Map<String, Value>,
    ) -> Result<ActionOutcome, ActionError> {
        let config: SetVariableConfig = parse_config("setVariable", config)?;
        if config.name.is_empty() {
            return Err(ActionError::invalid_config("setVariable", "name is required"));
        }
        let output = json!({"name": config.name.clone(), "value": config.value.clone()});
        Ok(ActionOutcome::new(output).with_variable(config.name, config.value))
    }
}
