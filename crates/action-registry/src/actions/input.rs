use async_trait::async_trait;
use page_driver::PageDriver;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::handler::{parse_config, ActionError, ActionHandler, ActionOutcome};

fn default_clear_first() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InputConfig {
    selector: String,
    value: String,
    #[serde(default = "default_clear_first")]
    clear_first: bool,
}

/// Type a value into the first element matching a selector.
pub struct InputAction;

#[async_trait]
impl ActionHandler for InputAction {
    async fn run(
        &self,
        session: &dyn PageDriver,
        config: &Map<String, Value>,
    ) -> Result<ActionOutcome, ActionError> {
        let config: InputConfig = parse_config("input", config)?;
        session
            .fill(&config.selector, &config.value, config.clear_first)
            .await?;
        Ok(ActionOutcome::new(json!({"filled": true})))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::testing::MockPage;

    #[tokio::test]
    async fn clears_before_typing_by_default() {
        let page = MockPage::new();
        let config = json!({"selector": "#name", "value": "ada"});
        InputAction
            .run(&page, config.as_object().expect("object"))
            .await
            .expect("fill");
        assert_eq!(page.calls(), ["fill #name=ada clear=true"]);
    }

    #[tokio::test]
    async fn clear_first_false_is_honoured() {
        let page = MockPage::new();
        let config = json!({"selector": "#name", "value": "ada", "clearFirst": false});
        InputAction
            .run(&page, config.as_object().expect("object"))
            .await
            .expect("fill");
        assert_eq!(page.calls(), ["fill #name=ada clear=false"]);
    }
}
