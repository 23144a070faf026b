//! Authenticated portal session.
//!
//! A session owns one driver for its whole lifetime. Starting it logs in, walks
//! to the consumption page and parses the roster; afterwards any number of
//! exports can be run one after another. Closing always shuts the driver down,
//! including when starting failed half way.

use crate::error::{DriverError, PortalError};
use crate::portal::download::DownloadChannel;
use crate::portal::driver::Driver;
use crate::portal::export::{run_export, ExportArtifact, ExportRequest};
use crate::portal::navigation::{self, NavigationPlan};
use crate::portal::roster::{parse_roster, Installation, Roster};
use crate::portal::selectors;
use crate::portal::watcher::DEFAULT_POLL_INTERVAL;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_HOME_URL: &str = "https://www.linznetz.at/portal/de/home";

/// Login secrets. Only used while logging in and dropped afterwards.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub home_url: String,
    /// Bound for every wait that is not a navigation probe.
    pub timeout: Duration,
    /// Bound for each navigation link candidate.
    pub probe_timeout: Duration,
    pub download_timeout: Duration,
    /// Bound for one whole export, download included.
    pub export_timeout: Duration,
    pub poll_interval: Duration,
    /// Pause after clicks that trigger partial page updates.
    pub settle: Duration,
    pub navigation_settle: Duration,
    pub navigation_plan: NavigationPlan,
    pub download_root: Option<PathBuf>,
    pub diagnostics_dir: Option<PathBuf>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            home_url: DEFAULT_HOME_URL.to_string(),
            timeout: Duration::from_secs(120),
            probe_timeout: Duration::from_secs(15),
            download_timeout: Duration::from_secs(30),
            export_timeout: Duration::from_secs(300),
            poll_interval: DEFAULT_POLL_INTERVAL,
            settle: Duration::from_millis(100),
            navigation_settle: Duration::from_secs(2),
            navigation_plan: NavigationPlan::consumption(),
            download_root: None,
            diagnostics_dir: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unstarted,
    BrowserReady,
    OnLoginPage,
    Authenticated,
    OnConsumptionPage,
    Ready,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            SessionState::Unstarted => "unstarted",
            SessionState::BrowserReady => "browser-ready",
            SessionState::OnLoginPage => "on-login-page",
            SessionState::Authenticated => "authenticated",
            SessionState::OnConsumptionPage => "on-consumption-page",
            SessionState::Ready => "ready",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

pub struct Session<D: Driver> {
    driver: D,
    options: SessionOptions,
    state: SessionState,
    roster: Roster,
    downloads: DownloadChannel,
}

impl<D: Driver> Session<D> {
    /// Logs in with `credentials` on an already launched driver and prepares
    /// the roster.
    ///
    /// On failure the driver is closed before returning. If closing fails too,
    /// the start error stays the primary one.
    pub async fn start(
        mut driver: D,
        credentials: Credentials,
        options: SessionOptions,
    ) -> Result<Self, PortalError> {
        let downloads = match DownloadChannel::create(options.download_root.as_deref()) {
            Ok(downloads) => downloads,
            Err(e) => {
                let err = PortalError::Download(e);
                return Err(match driver.close().await {
                    Ok(()) => err,
                    Err(teardown) => err.with_teardown_failure(teardown),
                });
            }
        };

        let mut session = Session {
            driver,
            options,
            state: SessionState::Unstarted,
            roster: Roster::default(),
            downloads,
        };
        session.transition(SessionState::BrowserReady);

        match session.bootstrap(credentials).await {
            Ok(()) => Ok(session),
            Err(e) => Err(session.close_after(e).await),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn installations(&self) -> &[Installation] {
        &self.roster.installations
    }

    /// Exports quarter-hour consumption for one installation.
    ///
    /// The session stays usable after a failed export, although the portal page
    /// may be left mid-way; restarting the session is the safe recovery.
    pub async fn export(&mut self, request: &ExportRequest) -> Result<ExportArtifact, PortalError> {
        run_export(&self.driver, &mut self.downloads, &self.options, request).await
    }

    pub async fn close(self) -> Result<(), PortalError> {
        self.teardown().await.map_err(PortalError::from)
    }

    /// Closes the session after `err` and returns `err`, annotated with a
    /// teardown failure if there was one.
    pub async fn close_after(self, err: PortalError) -> PortalError {
        match self.teardown().await {
            Ok(()) => err,
            Err(teardown) => {
                tracing::warn!(error = %teardown, "Session teardown failed after error");
                err.with_teardown_failure(teardown)
            }
        }
    }

    async fn bootstrap(&mut self, credentials: Credentials) -> Result<(), PortalError> {
        self.login(credentials).await?;
        self.open_consumption_page().await?;

        let html = self.driver.content().await?;
        self.roster = parse_roster(&html)?;
        tracing::info!(
            address = self.roster.address.as_str(),
            installations = self.roster.len(),
            "Parsed installation roster"
        );
        self.transition(SessionState::Ready);
        Ok(())
    }

    async fn login(&mut self, credentials: Credentials) -> Result<(), PortalError> {
        let timeout = self.options.timeout;
        self.driver.navigate(&self.options.home_url).await?;
        self.driver
            .click_selector(selectors::LOGIN_LINK, timeout)
            .await
            .map_err(|e| PortalError::authentication_failed(selectors::LOGIN_LINK, e))?;
        self.transition(SessionState::OnLoginPage);

        self.fill(selectors::USERNAME_FIELD, &credentials.username)
            .await
            .map_err(|e| PortalError::authentication_failed(selectors::USERNAME_FIELD, e))?;
        self.fill(selectors::PASSWORD_FIELD, &credentials.password)
            .await
            .map_err(|e| PortalError::authentication_failed(selectors::PASSWORD_FIELD, e))?;
        drop(credentials);

        self.driver
            .click_selector(selectors::LOGIN_SUBMIT, timeout)
            .await
            .map_err(|e| PortalError::authentication_failed(selectors::LOGIN_SUBMIT, e))?;
        self.transition(SessionState::Authenticated);
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<(), DriverError> {
        self.driver
            .wait_for_selector(selector, self.options.timeout)
            .await?;
        self.driver.focus(selector).await?;
        self.driver.type_text(value).await
    }

    async fn open_consumption_page(&mut self) -> Result<(), PortalError> {
        let reached = match navigation::follow(
            &self.driver,
            &self.options.navigation_plan,
            self.options.probe_timeout,
            self.options.navigation_settle,
        )
        .await
        {
            Ok(()) => self
                .driver
                .wait_for_selector(selectors::CONSUMPTION_HEADING, self.options.timeout)
                .await
                .map(|_| ())
                .map_err(|e| PortalError::navigation_failed(selectors::CONSUMPTION_HEADING, e)),
            Err(e) => Err(e),
        };

        if let Err(e) = reached {
            if matches!(e, PortalError::NavigationFailed { .. }) {
                self.capture_diagnostics().await;
            }
            return Err(e);
        }
        self.transition(SessionState::OnConsumptionPage);
        Ok(())
    }

    /// Keeps the page markup around so that portal layout changes can be
    /// inspected after the fact.
    async fn capture_diagnostics(&self) {
        let html = match self.driver.content().await {
            Ok(html) => html,
            Err(e) => {
                tracing::debug!(error = %e, "Could not capture page after navigation failure");
                return;
            }
        };
        tracing::debug!(bytes = html.len(), "Captured page after navigation failure");

        let Some(dir) = &self.options.diagnostics_dir else {
            return;
        };
        let path = dir.join(format!(
            "navigation-failure-{}.html",
            chrono::Local::now().format("%Y%m%dT%H%M%S")
        ));
        let written = match tokio::fs::create_dir_all(dir).await {
            Ok(()) => tokio::fs::write(&path, html).await,
            Err(e) => Err(e),
        };
        match written {
            Ok(()) => tracing::info!(path = %path.display(), "Wrote navigation diagnostics"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to write navigation diagnostics"),
        }
    }

    fn transition(&mut self, next: SessionState) {
        tracing::info!(from = %self.state, to = %next, "Session state changed");
        self.state = next;
    }

    /// Closes the driver and removes the download root. Both always run; the
    /// driver error is reported first.
    async fn teardown(mut self) -> Result<(), DriverError> {
        self.transition(SessionState::Closed);
        let closed = self.driver.close().await;
        let removed = self.downloads.close().map_err(DriverError::from);
        closed.and(removed)
    }
}
