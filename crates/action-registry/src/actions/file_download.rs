use std::path::PathBuf;

use async_trait::async_trait;
use page_driver::PageDriver;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::handler::{parse_config, ActionError, ActionHandler, ActionOutcome};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileDownloadConfig {
    url: String,
    save_path: PathBuf,
}

/// Fetch a URL and stream it to disk.
pub struct FileDownloadAction {
    client: reqwest::Client,
}

impl FileDownloadAction {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for FileDownloadAction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActionHandler for FileDownloadAction {
    async fn run(
        &self,
        _session: &dyn PageDriver,
        config: &Map<String, Value>,
    ) -> Result<ActionOutcome, ActionError> {
        let config: FileDownloadConfig = parse_config("fileDownload", config)?;

        let response = self
            .client
            .get(&config.url)
            .send()
            .await
            .map_err(|err| ActionError::Http(err.to_string()))?
            .error_for_status()
            .map_err(|err| ActionError::Http(err.to_string()))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ActionError::Http(err.to_string()))?;

        if let Some(parent) = config.save_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| ActionError::io("fileDownload", err))?;
        }
        tokio::fs::write(&config.save_path, &bytes)
            .await
            .map_err(|err| ActionError::io("fileDownload", err))?;

        debug!(url = %config.url, size = bytes.len(), "file downloaded");
        Ok(ActionOutcome::new(json!({
            "savedPath": config.save_path,
            "size": bytes.len(),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::testing::MockPage;

    #[tokio::test]
    async fn unreachable_url_is_an_http_failure() {
        let page = MockPage::new();
        let config = json!({
            "url": "http://127.0.0.1:1/never",
            "savePath": "/tmp/flowrunner-test-download",
        });
        let err = FileDownloadAction::new()
            .run(&page, config.as_object().expect("object"))
            .await
            .expect_err("nothing listens on port 1");
        assert!(matches!(err, ActionError::Http(_)));
    }

    #[tokio::test]
    async fn missing_save_path_is_invalid_config() {
        let page = MockPage::new();
        let config = json!({"url": "http://a.test/file"});
        let err = FileDownloadAction::new()
            .run(&page, config.as_object().expect("object"))
            .await
            .expect_err("savePath required");
        assert!(matches!(err, ActionError::InvalidConfig { .. }));
    }
}
