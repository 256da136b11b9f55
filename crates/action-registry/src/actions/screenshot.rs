use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as Base64, Engine as _};
use page_driver::PageDriver;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::handler::{parse_config, ActionError, ActionHandler, ActionOutcome};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScreenshotConfig {
    #[serde(default)]
    full_page: bool,
}

/// Capture the page as a base64 PNG.
pub struct ScreenshotAction;

#[async_trait]
impl ActionHandler for ScreenshotAction {
    async fn run(
        &self,
        session: &dyn PageDriver,
        config: &Map<String, Value>,
    ) -> Result<ActionOutcome, ActionError> {
        let config: ScreenshotConfig = parse_config("screenshot", config)?;
        let bytes = session.screenshot(config.full_page).await?;
        let encoded = Base64.encode(bytes);
        Ok(ActionOutcome::new(json!({"screenshot": encoded.clone()})).with_screenshot(encoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::testing::MockPage;

    #[tokio::test]
    async fn encodes_png_bytes_once_for_output_and_payload() {
        let page = MockPage::new();
        let config = json!({});
        let outcome = ScreenshotAction
            .run(&page, config.as_object().expect("object"))
            .await
            .expect("screenshot");

        let encoded = outcome.screenshot.expect("payload");
        assert_eq!(outcome.output["screenshot"], encoded);
        assert_eq!(Base64.decode(encoded).expect("decodes"), [0x89, 0x50, 0x4e, 0x47]);
        assert_eq!(page.calls(), ["screenshot full=false"]);
    }

    #[tokio::test]
    async fn full_page_flag_reaches_the_driver() {
        let page = MockPage::new();
        let config = json!({"fullPage": true});
        ScreenshotAction
            .run(&page, config.as_object().expect("object"))
            .await
            .expect("screenshot");
        assert_eq!(page.calls(), ["screenshot full=true"]);
    }
}
