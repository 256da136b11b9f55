use std::time::Duration;

use async_trait::async_trait;
use page_driver::PageDriver;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::handler::{parse_config, ActionError, ActionHandler, ActionOutcome};

const POST_LOGIN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginConfig {
    url: String,
    username_selector: String,
    password_selector: String,
    submit_selector: String,
    username: String,
    password: String,
    #[serde(default)]
    wait_for_selector: Option<String>,
}

/// Composite form login: navigate, fill both credentials, submit, then wait
/// for either a landmark selector or the navigation to settle.
pub struct LoginAction;

#[async_trait]
impl ActionHandler for LoginAction {
    async fn run(
        &self,
        session: &dyn PageDriver,
        config: &Map<String, Value>,
    ) -> Result<ActionOutcome, ActionError> {
        let config: LoginConfig = parse_config("login", config)?;

        session.goto(&config.url).await?;
        session
            .fill(&config.username_selector, &config.username, true)
            .await?;
        session
            .fill(&config.password_selector, &config.password, true)
            .await?;
        session.click(&config.submit_selector).await?;

        match &config.wait_for_selector {
            Some(selector) => {
                session
                    .wait_for_selector(selector, POST_LOGIN_TIMEOUT)
                    .await?
            }
            None => session.wait_for_navigation().await?,
        }

        let current_url = session.current_url().await?;
        Ok(ActionOutcome::new(json!({
            "success": true,
            "currentUrl": current_url,
        })))
    }
}
