use async_trait::async_trait;
use page_driver::PageDriver;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::handler::{parse_config, ActionError, ActionHandler, ActionOutcome};

#[derive(Deserialize)]
struct ClickConfig {
    selector: String,
}

/// Click the first element matching a selector.
pub struct ClickAction;

#[async_trait]
impl ActionHandler for ClickAction {
    async fn run(
        &self,
        session: &dyn PageDriver,
        config: &Map<String, Value>,
    ) -> Result<ActionOutcome, ActionError> {
        let config: ClickConfig = parse_config("click", config)?;
        session.click(&config.selector).await?;
        Ok(ActionOutcome::new(json!({"clicked": true})))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::testing::MockPage;

    #[tokio::test]
    async fn clicks_and_reports() {
        let page = MockPage::new();
        let config = json!({"selector": "#submit"});
        let outcome = ClickAction
            .run(&page, config.as_object().expect("object"))
            .await
            .expect("click");
        assert_eq!(outcome.output["clicked"], true);
    }

    #[tokio::test]
    async fn missing_element_surfaces_driver_error() {
        let page = MockPage::new();
        let config = json!({"selector": "#fail-button"});
        let err = ClickAction
            .run(&page, config.as_object().expect("object"))
            .await
            .expect_err("selector misses");
        assert!(matches!(err, ActionError::Driver(_)));
    }
}
