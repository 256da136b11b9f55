//! Fire-and-forget callback delivery.

use std::time::Duration;

use flowrunner_core_types::CallbackEvent;
use tracing::debug;

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts callback events to the caller's URL. Delivery is best-effort: the
/// engine never waits on it and failures are only logged.
#[derive(Clone)]
pub struct CallbackSender {
    client: reqwest::Client,
}

impl CallbackSender {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(CALLBACK_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// Post `event` to `url` in the background.
    pub fn dispatch(&self, url: &str, event: CallbackEvent) {
        let client = self.client.clone();
        let url = url.to_string();
        tokio::spawn(async move {
            match client.post(&url).json(&event).send().await {
                Ok(response) if !response.status().is_success() => {
                    debug!(%url, status = %response.status(), "callback rejected");
                }
                Ok(_) => {}
                Err(err) => {
                    debug!(%url, %err, "callback delivery failed");
                }
            }
        });
    }
}

impl Default for CallbackSender {
    fn default() -> Self {
        Self::new()
    }
}
