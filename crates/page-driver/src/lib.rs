//! Contracts between the flow engine and the browser layer.
//!
//! The engine never talks to a concrete automation driver; it sees one
//! isolated session through [`PageDriver`] and obtains/returns sessions
//! through [`SessionProvider`]. `browser-pool` supplies the chromiumoxide
//! implementation; tests substitute mocks.

pub mod error;
pub mod pool;

use std::time::Duration;

use async_trait::async_trait;

pub use error::DriverError;
pub use pool::{PoolError, PoolSettings, PoolStatus, SessionProvider};

/// Result of a navigation.
#[derive(Clone, Debug)]
pub struct PageInfo {
    pub url: String,
    pub title: String,
}

/// The per-session browser surface the builtin actions are written against.
///
/// One instance maps to one isolated page, exclusively owned by exactly one
/// execution for its whole duration.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate and wait for the document to be ready.
    async fn goto(&self, url: &str) -> Result<PageInfo, DriverError>;

    /// Click the first element matching `selector`.
    async fn click(&self, selector: &str) -> Result<(), DriverError>;

    /// Type `value` into the first element matching `selector`, optionally
    /// clearing the current value first.
    async fn fill(&self, selector: &str, value: &str, clear_first: bool)
        -> Result<(), DriverError>;

    /// Extract `attribute` from the first matching element.
    /// `textContent` and `innerHTML` are understood as pseudo-attributes.
    async fn extract_first(&self, selector: &str, attribute: &str)
        -> Result<String, DriverError>;

    /// Extract `attribute` from every matching element, falling back to the
    /// element text when the attribute is absent.
    async fn extract_all(
        &self,
        selector: &str,
        attribute: &str,
    ) -> Result<Vec<String>, DriverError>;

    /// Wait until `selector` matches, or fail after `timeout`.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration)
        -> Result<(), DriverError>;

    /// Wait for the current navigation to settle.
    async fn wait_for_navigation(&self) -> Result<(), DriverError>;

    /// Capture a PNG screenshot.
    async fn screenshot(&self, full_page: bool) -> Result<Vec<u8>, DriverError>;

    /// URL of the current document.
    async fn current_url(&self) -> Result<String, DriverError>;
}
