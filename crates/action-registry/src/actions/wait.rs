use std::time::Duration;

use async_trait::async_trait;
use page_driver::PageDriver;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::handler::{parse_config, ActionError, ActionHandler, ActionOutcome};

const SELECTOR_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_DELAY_MS: u64 = 1000;

#[derive(Deserialize)]
struct WaitConfig {
    #[serde(rename = "type", default)]
    wait_type: String,
    #[serde(default)]
    value: Option<Value>,
}

/// Pause the flow: a fixed delay, a selector appearing, or navigation
/// settling. Unrecognized types degrade to the default delay.
pub struct WaitAction;

impl WaitAction {
    fn delay_ms(value: Option<&Value>) -> u64 {
        let ms = match value {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
            _ => 0.0,
        };
        if ms.is_finite() && ms >= 1.0 {
            ms as u64
        } else {
            DEFAULT_DELAY_MS
        }
    }
}

#[async_trait]
impl ActionHandler for WaitAction {
    async fn run(
        &self,
        session: &dyn PageDriver,
        config: &Map<String, Value>,
    ) -> Result<ActionOutcome, ActionError> {
        let config: WaitConfig = parse_config("wait", config)?;

        match config.wait_type.as_str() {
            "selector" => {
                let selector = match config.value {
                    Some(Value::String(s)) => s,
                    Some(other) => other.to_string(),
                    None => {
                        return Err(ActionError::invalid_config(
                            "wait",
                            "selector wait requires a value",
                        ))
                    }
                };
                session
                    .wait_for_selector(&selector, SELECTOR_TIMEOUT)
                    .await?;
            }
            "navigation" => {
                session.wait_for_navigation().await?;
            }
            // "delay" and anything unrecognized sleep for the configured or
            // default duration.
            _ => {
                tokio::time::sleep(Duration::from_millis(Self::delay_ms(config.value.as_ref())))
                    .await;
            }
        }

        Ok(ActionOutcome::new(json!({"waited": true})))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::testing::MockPage;

    #[test]
    fn delay_coerces_numbers_and_numeric_strings() {
        assert_eq!(WaitAction::delay_ms(Some(&json!(250))), 250);
        assert_eq!(WaitAction::delay_ms(Some(&json!("250"))), 250);
        assert_eq!(WaitAction::delay_ms(Some(&json!("soon"))), DEFAULT_DELAY_MS);
        assert_eq!(WaitAction::delay_ms(None), DEFAULT_DELAY_MS);
    }

    #[tokio::test]
    async fn selector_wait_delegates_to_the_driver() {
        let page = MockPage::new();
        let config = json!({"type": "selector", "value": "#ready"});
        WaitAction
            .run(&page, config.as_object().expect("object"))
            .await
            .expect("wait");
        assert_eq!(page.calls(), ["wait-for #ready"]);
    }

    #[tokio::test]
    async fn navigation_wait_delegates_to_the_driver() {
        let page = MockPage::new();
        let config = json!({"type": "navigation"});
        WaitAction
            .run(&page, config.as_object().expect("object"))
            .await
            .expect("wait");
        assert_eq!(page.calls(), ["wait-for-navigation"]);
    }
}
