use async_trait::async_trait;
use page_driver::PageDriver;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::handler::{parse_config, ActionError, ActionHandler, ActionOutcome};

#[derive(Deserialize)]
struct NavigateConfig {
    url: String,
}

/// Load a URL and report where the session landed.
pub struct NavigateAction;

#[async_trait]
impl ActionHandler for NavigateAction {
    async fn run(
        &self,
        session: &dyn PageDriver,
        config: &Map<String, Value>,
    ) -> Result<ActionOutcome, ActionError> {
        let config: NavigateConfig = parse_config("navigate", config)?;
        let info = session.goto(&config.url).await?;
        Ok(ActionOutcome::new(json!({
            "url": info.url,
            "title": info.title,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::testing::MockPage;

    #[tokio::test]
    async fn reports_landing_url_and_title() {
        let page = MockPage::new();
        let config = json!({"url": "https://a.test/start"});
        let outcome = NavigateAction
            .run(&page, config.as_object().expect("object"))
            .await
            .expect("navigate");

        assert_eq!(outcome.output["url"], "https://a.test/start");
        assert_eq!(outcome.output["title"], "Mock Page");
        assert_eq!(page.calls(), ["goto https://a.test/start"]);
    }

    #[tokio::test]
    async fn missing_url_is_invalid_config() {
        let page = MockPage::new();
        let config = json!({});
        let err = NavigateAction
            .run(&page, config.as_object().expect("object"))
            .await
            .expect_err("no url");
        assert!(matches!(err, ActionError::InvalidConfig { .. }));
    }
}
