//! Interaction driver capability.
//!
//! The session and export code only talk to the browser through this trait, so
//! the portal flow can run against Chromium in production and against an
//! in-process fake in tests.

use crate::error::DriverError;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// A controllable browser page.
///
/// One driver owns one page. Calls are issued sequentially; implementations do
/// not have to support interleaved use from several tasks.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Handle to an element on the current page.
    type Element: Send + Sync;

    /// Loads `url` in the page.
    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    /// Waits until `selector` matches and returns the first match.
    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Self::Element, DriverError>;

    /// Waits until `xpath` matches and returns the first match.
    async fn wait_for_xpath(
        &self,
        xpath: &str,
        timeout: Duration,
    ) -> Result<Self::Element, DriverError>;

    async fn click(&self, element: &Self::Element) -> Result<(), DriverError>;

    /// Focuses the first element matching `selector`. Later `type_text` and
    /// `press_key` calls go to this element.
    async fn focus(&self, selector: &str) -> Result<(), DriverError>;

    async fn type_text(&self, text: &str) -> Result<(), DriverError>;

    /// Presses a named key (`"Backspace"`, `"End"`, ...) on the focused element.
    async fn press_key(&self, key: &str) -> Result<(), DriverError>;

    /// Evaluates a script expression in the page and returns its JSON value.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, DriverError>;

    /// Returns every element matching `selector` in document order.
    async fn query_all(&self, selector: &str) -> Result<Vec<Self::Element>, DriverError>;

    async fn text(&self, element: &Self::Element) -> Result<String, DriverError>;

    /// Suspends (`false`) or resumes (`true`) script execution on the page.
    async fn set_script_execution(&self, enabled: bool) -> Result<(), DriverError>;

    /// Routes triggered downloads into `directory`, or refuses downloads when `None`.
    async fn set_download_target(&self, directory: Option<&Path>) -> Result<(), DriverError>;

    /// Returns the full markup of the current page.
    async fn content(&self) -> Result<String, DriverError>;

    /// Shuts the browser down. The driver must not be used afterwards.
    async fn close(&mut self) -> Result<(), DriverError>;

    /// Waits for `selector` and clicks the first match.
    async fn click_selector(&self, selector: &str, timeout: Duration) -> Result<(), DriverError> {
        let element = self.wait_for_selector(selector, timeout).await?;
        self.click(&element).await
    }
}
