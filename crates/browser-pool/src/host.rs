//! The shared Chromium process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use page_driver::{PoolError, PoolSettings};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// One launched browser process plus its CDP event loop. Recreated by the
/// pool whenever the event loop has stopped.
pub(crate) struct BrowserHost {
    browser: Browser,
    handler_task: JoinHandle<()>,
    connected: Arc<AtomicBool>,
}

impl BrowserHost {
    pub(crate) async fn launch(settings: &PoolSettings) -> Result<Self, PoolError> {
        let config = Self::browser_config(settings)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|err| PoolError::Host(format!("failed to launch chromium: {err}")))?;

        let connected = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&connected);
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
            flag.store(false, Ordering::SeqCst);
            debug!("browser host event loop ended");
        });

        Ok(Self {
            browser,
            handler_task,
            connected,
        })
    }

    fn browser_config(settings: &PoolSettings) -> Result<BrowserConfig, PoolError> {
        let window_size = format!(
            "--window-size={},{}",
            settings.viewport_width, settings.viewport_height
        );
        let mut args = vec![
            "--no-sandbox".to_string(),
            "--disable-setuid-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            window_size,
        ];
        if settings.headless {
            args.push("--hide-scrollbars".to_string());
            args.push("--mute-audio".to_string());
        }

        let mut builder = BrowserConfig::builder()
            .request_timeout(Duration::from_secs(30))
            .args(args);
        if !settings.headless {
            builder = builder.with_head();
        }
        if let Some(executable) = &settings.chrome_executable {
            builder = builder.chrome_executable(executable.clone());
        }

        builder
            .build()
            .map_err(|err| PoolError::Host(format!("browser config error: {err}")))
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub(crate) async fn new_page(&self) -> Result<Page, PoolError> {
        self.browser
            .new_page("about:blank")
            .await
            .map_err(|err| PoolError::Session(err.to_string()))
    }

    pub(crate) async fn shutdown(mut self) {
        if let Err(err) = self.browser.close().await {
            warn!(%err, "browser close failed");
        }
        if let Err(err) = self.browser.wait().await {
            warn!(%err, "browser did not exit cleanly");
        }
        self.handler_task.abort();
        self.connected.store(false, Ordering::SeqCst);
    }
}
