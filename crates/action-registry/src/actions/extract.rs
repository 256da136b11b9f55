use async_trait::async_trait;
use page_driver::PageDriver;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::handler::{parse_config, ActionError, ActionHandler, ActionOutcome};

fn default_attribute() -> String {
    "textContent".to_string()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtractConfig {
    selector: String,
    #[serde(default = "default_attribute")]
    attribute: String,
    #[serde(default)]
    multiple: bool,
    #[serde(default)]
    save_as: Option<String>,
}

/// Read text, markup or an attribute out of the page, optionally saving it
/// as an execution variable.
pub struct ExtractAction;

#[async_trait]
impl ActionHandler for ExtractAction {
    async fn run(
        &self,
        session: &dyn PageDriver,
        config: &Map<String, Value>,
    ) -> Result<ActionOutcome, ActionError> {
        let config: ExtractConfig = parse_config("extract", config)?;

        let data = if config.multiple {
            let values = session
                .extract_all(&config.selector, &config.attribute)
                .await?;
            Value::from(values)
        } else {
            let value = session
                .extract_first(&config.selector, &config.attribute)
                .await?;
            Value::from(value)
        };

        let mut outcome = ActionOutcome::new(json!({"data": data.clone()}));
        if let Some(name) = config.save_as {
            outcome = outcome.with_variable(name, data);
        }
        Ok(outcome)
    }
}
