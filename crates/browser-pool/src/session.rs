//! One pooled page, exclusively owned by a single execution.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Element, Page};
use flowrunner_core_types::ExecutionId;
use page_driver::{DriverError, PageDriver, PageInfo};
use tracing::trace;

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct PooledSession {
    execution_id: ExecutionId,
    page: Page,
}

impl PooledSession {
    pub(crate) fn new(execution_id: ExecutionId, page: Page) -> Self {
        Self { execution_id, page }
    }

    pub fn execution_id(&self) -> &ExecutionId {
        &self.execution_id
    }

    pub(crate) async fn close(&self) -> Result<(), CdpError> {
        self.page.clone().close().await?;
        Ok(())
    }

    async fn find(&self, selector: &str) -> Result<Element, DriverError> {
        self.page
            .find_element(selector)
            .await
            .map_err(|_| DriverError::element_not_found(selector))
    }

    async fn element_value(element: &Element, attribute: &str) -> Result<String, DriverError> {
        let value = match attribute {
            "textContent" => element.inner_text().await.map_err(protocol)?,
            "innerHTML" => element.inner_html().await.map_err(protocol)?,
            attr => element.attribute(attr).await.map_err(protocol)?,
        };
        Ok(value.unwrap_or_default())
    }
}

fn protocol(err: CdpError) -> DriverError {
    DriverError::Protocol(err.to_string())
}

#[async_trait]
impl PageDriver for PooledSession {
    async fn goto(&self, url: &str) -> Result<PageInfo, DriverError> {
        trace!(execution = %self.execution_id, url, "navigate");
        self.page
            .goto(url)
            .await
            .map_err(|err| DriverError::Navigation(err.to_string()))?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(|err| DriverError::Navigation(err.to_string()))?;

        let url = self.page.url().await.map_err(protocol)?.unwrap_or_default();
        let title = self
            .page
            .get_title()
            .await
            .map_err(protocol)?
            .unwrap_or_default();
        Ok(PageInfo { url, title })
    }

    async fn click(&self, selector: &str) -> Result<(), DriverError> {
        let element = self.find(selector).await?;
        element.click().await.map_err(protocol)?;
        Ok(())
    }

    async fn fill(
        &self,
        selector: &str,
        value: &str,
        clear_first: bool,
    ) -> Result<(), DriverError> {
        let element = self.find(selector).await?;
        if clear_first {
            element
                .call_js_fn("function() { this.value = ''; }", false)
                .await
                .map_err(protocol)?;
        }
        element.focus().await.map_err(protocol)?;
        element.type_str(value).await.map_err(protocol)?;
        Ok(())
    }

    async fn extract_first(
        &self,
        selector: &str,
        attribute: &str,
    ) -> Result<String, DriverError> {
        let element = self.find(selector).await?;
        Self::element_value(&element, attribute).await
    }

    async fn extract_all(
        &self,
        selector: &str,
        attribute: &str,
    ) -> Result<Vec<String>, DriverError> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(|_| DriverError::element_not_found(selector))?;

        let mut values = Vec::with_capacity(elements.len());
        for element in &elements {
            // Prefer the named attribute, fall back to the element text.
            let attr = element.attribute(attribute).await.map_err(protocol)?;
            let value = match attr {
                Some(value) => value,
                None => element
                    .inner_text()
                    .await
                    .map_err(protocol)?
                    .unwrap_or_default(),
            };
            values.push(value);
        }
        Ok(values)
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), DriverError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(DriverError::WaitTimeout(selector.to_string()));
            }
            tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
        }
    }

    async fn wait_for_navigation(&self) -> Result<(), DriverError> {
        self.page
            .wait_for_navigation()
            .await
            .map_err(|err| DriverError::Navigation(err.to_string()))?;
        Ok(())
    }

    async fn screenshot(&self, full_page: bool) -> Result<Vec<u8>, DriverError> {
        self.page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(full_page)
                    .build(),
            )
            .await
            .map_err(protocol)
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        Ok(self.page.url().await.map_err(protocol)?.unwrap_or_default())
    }
}
