//! Chromium-backed driver speaking the DevTools protocol.

use crate::error::{DriverError, PortalError};
use crate::portal::driver::Driver;
use crate::portal::session::{Credentials, Session, SessionOptions};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::{
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use chromiumoxide::cdp::browser_protocol::emulation::SetScriptExecutionDisabledParams;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub headless: bool,
    /// Default bound for protocol requests.
    pub timeout: Duration,
    pub chrome_path: Option<PathBuf>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            timeout: Duration::from_secs(120),
            chrome_path: None,
        }
    }
}

pub struct ChromiumDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    focused: Mutex<Option<Element>>,
}

impl ChromiumDriver {
    pub async fn launch(options: &LaunchOptions) -> Result<Self, DriverError> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(options.timeout)
            .no_sandbox()
            .arg("--disable-gpu");
        if !options.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &options.chrome_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(DriverError::Launch)?;

        tracing::info!(headless = options.headless, "Launching browser");
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| DriverError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "Browser handler event error");
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(e.into());
            }
        };

        Ok(Self {
            browser,
            page,
            handler,
            focused: Mutex::new(None),
        })
    }

    /// Retries `find` until it yields an element or `timeout` passes.
    async fn poll_for<F, Fut>(
        &self,
        target: &str,
        timeout: Duration,
        mut find: F,
    ) -> Result<Element, DriverError>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<Element, chromiumoxide::error::CdpError>> + Send,
    {
        let polling = async {
            loop {
                if let Ok(element) = find().await {
                    return element;
                }
                tokio::time::sleep(WAIT_POLL_INTERVAL).await;
            }
        };
        tokio::time::timeout(timeout, polling)
            .await
            .map_err(|_| DriverError::Timeout {
                target: target.to_string(),
                timeout,
            })
    }
}

#[async_trait]
impl Driver for ChromiumDriver {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        tracing::debug!(url, "Navigating");
        self.page.goto(url).await?;
        Ok(())
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Element, DriverError> {
        let page = &self.page;
        self.poll_for(selector, timeout, || page.find_element(selector))
            .await
    }

    async fn wait_for_xpath(&self, xpath: &str, timeout: Duration) -> Result<Element, DriverError> {
        let page = &self.page;
        self.poll_for(xpath, timeout, || page.find_xpath(xpath)).await
    }

    async fn click(&self, element: &Element) -> Result<(), DriverError> {
        element.click().await?;
        Ok(())
    }

    async fn focus(&self, selector: &str) -> Result<(), DriverError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| DriverError::NotFound(selector.to_string()))?;
        element.focus().await?;
        *self.focused.lock().await = Some(element);
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<(), DriverError> {
        let focused = self.focused.lock().await;
        let element = focused.as_ref().ok_or(DriverError::NoFocus)?;
        element.type_str(text).await?;
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<(), DriverError> {
        let focused = self.focused.lock().await;
        let element = focused.as_ref().ok_or(DriverError::NoFocus)?;
        element.press_key(key).await?;
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, DriverError> {
        let result = self.page.evaluate(script).await?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Element>, DriverError> {
        Ok(self.page.find_elements(selector).await?)
    }

    async fn text(&self, element: &Element) -> Result<String, DriverError> {
        Ok(element.inner_text().await?.unwrap_or_default())
    }

    async fn set_script_execution(&self, enabled: bool) -> Result<(), DriverError> {
        self.page
            .execute(SetScriptExecutionDisabledParams::new(!enabled))
            .await?;
        Ok(())
    }

    async fn set_download_target(&self, directory: Option<&Path>) -> Result<(), DriverError> {
        let mut params = SetDownloadBehaviorParams::builder();
        params = match directory {
            Some(dir) => params
                .behavior(SetDownloadBehaviorBehavior::Allow)
                .download_path(dir.to_string_lossy().into_owned()),
            None => params.behavior(SetDownloadBehaviorBehavior::Deny),
        };
        let params = params.build().map_err(DriverError::Protocol)?;
        self.browser.execute(params).await?;
        Ok(())
    }

    async fn content(&self) -> Result<String, DriverError> {
        Ok(self.page.content().await?)
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        tracing::info!("Closing browser");
        self.focused.lock().await.take();
        let closed = self.browser.close().await;
        let waited = self.browser.wait().await;
        self.handler.abort();
        closed?;
        waited?;
        Ok(())
    }
}

impl Drop for ChromiumDriver {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

impl Session<ChromiumDriver> {
    /// Launches Chromium and starts a session on it.
    pub async fn launch(
        credentials: Credentials,
        launch: &LaunchOptions,
        options: SessionOptions,
    ) -> Result<Self, PortalError> {
        let driver = ChromiumDriver::launch(launch).await?;
        Session::start(driver, credentials, options).await
    }
}
