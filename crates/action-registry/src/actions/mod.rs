//! The builtin handlers.

mod click;
mod csv_read;
mod csv_write;
mod extract;
mod file_download;
mod input;
mod login;
mod navigate;
mod screenshot;
mod set_variable;
mod wait;

pub use click::ClickAction;
pub use csv_read::CsvReadAction;
pub use csv_write::CsvWriteAction;
pub use extract::ExtractAction;
pub use file_download::FileDownloadAction;
pub use input::InputAction;
pub use login::LoginAction;
pub use navigate::NavigateAction;
pub use screenshot::ScreenshotAction;
pub use set_variable::SetVariableAction;
pub use wait::WaitAction;

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use page_driver::{DriverError, PageDriver, PageInfo};

    /// Scripted driver: records calls, fails on selectors/urls containing
    /// the marker `"#fail"`.
    #[derive(Default)]
    pub struct MockPage {
        pub calls: Mutex<Vec<String>>,
    }

    impl MockPage {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls lock").clone()
        }

        fn record(&self, call: impl Into<String>) {
            self.calls.lock().expect("calls lock").push(call.into());
        }

        fn check(&self, subject: &str) -> Result<(), DriverError> {
            if subject.contains("#fail") {
                return Err(DriverError::element_not_found(subject));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PageDriver for MockPage {
        async fn goto(&self, url: &str) -> Result<PageInfo, DriverError> {
            self.record(format!("goto {url}"));
            if url.contains("#fail") {
                return Err(DriverError::Navigation(format!("cannot reach {url}")));
            }
            Ok(PageInfo {
                url: url.to_string(),
                title: "Mock Page".to_string(),
            })
        }

        async fn click(&self, selector: &str) -> Result<(), DriverError> {
            self.record(format!("click {selector}"));
            self.check(selector)
        }

        async fn fill(
            &self,
            selector: &str,
            value: &str,
            clear_first: bool,
        ) -> Result<(), DriverError> {
            self.record(format!("fill {selector}={value} clear={clear_first}"));
            self.check(selector)
        }

        async fn extract_first(
            &self,
            selector: &str,
            attribute: &str,
        ) -> Result<String, DriverError> {
            self.record(format!("extract {selector}@{attribute}"));
            self.check(selector)?;
            Ok(format!("{attribute} of {selector}"))
        }

        async fn extract_all(
            &self,
            selector: &str,
            attribute: &str,
        ) -> Result<Vec<String>, DriverError> {
            self.record(format!("extract-all {selector}@{attribute}"));
            self.check(selector)?;
            Ok(vec!["first".to_string(), "second".to_string()])
        }

        async fn wait_for_selector(
            &self,
            selector: &str,
            _timeout: Duration,
        ) -> Result<(), DriverError> {
            self.record(format!("wait-for {selector}"));
            self.check(selector)
        }

        async fn wait_for_navigation(&self) -> Result<(), DriverError> {
            self.record("wait-for-navigation".to_string());
            Ok(())
        }

        async fn screenshot(&self, full_page: bool) -> Result<Vec<u8>, DriverError> {
            self.record(format!("screenshot full={full_page}"));
            Ok(vec![0x89, 0x50, 0x4e, 0x47])
        }

        async fn current_url(&self) -> Result<String, DriverError> {
            self.record("current-url".to_string());
            Ok("https://mock.test/landing".to_string())
        }
    }
}
