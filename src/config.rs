use crate::error::ConfigError;
use crate::portal::{Credentials, LaunchOptions, PortalDate, SessionOptions};
use anyhow::{anyhow, Result};
use chrono::{Duration as DateDuration, NaiveDate};
use serde_derive::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Debug)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl AppConfig {
    pub fn log_level(&self) -> tracing::Level {
        tracing::Level::from_str(self.log_level.as_str()).unwrap_or(tracing::Level::INFO)
    }
}

pub(crate) fn load_app_config() -> Result<AppConfig> {
    match envy::from_env::<AppConfig>() {
        Ok(config) => Ok(config),
        Err(err) => Err(anyhow!("Failed to load AppConfig: {}", err)),
    }
}

fn default_portal_url() -> String {
    "https://www.linznetz.at/portal/de/home".to_string()
}

fn default_timeout_seconds() -> u64 {
    120
}

fn default_headless() -> bool {
    true
}

fn default_probe_timeout_seconds() -> u64 {
    15
}

fn default_download_timeout_seconds() -> u64 {
    30
}

fn default_export_timeout_seconds() -> u64 {
    300
}

#[derive(Deserialize)]
pub struct PortalConfig {
    pub username: String,
    pub password: String,
    #[serde(default = "default_portal_url")]
    pub url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_headless")]
    pub headless: bool,
    pub chrome_path: Option<PathBuf>,
    // bound for each navigation link candidate
    #[serde(default = "default_probe_timeout_seconds")]
    pub probe_timeout_seconds: u64,
    #[serde(default = "default_download_timeout_seconds")]
    pub download_timeout_seconds: u64,
    #[serde(default = "default_export_timeout_seconds")]
    pub export_timeout_seconds: u64,
    pub download_root: Option<PathBuf>,
    pub diagnostics_dir: Option<PathBuf>,
}

impl std::fmt::Debug for PortalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("url", &self.url)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("headless", &self.headless)
            .field("chrome_path", &self.chrome_path)
            .field("probe_timeout_seconds", &self.probe_timeout_seconds)
            .field("download_timeout_seconds", &self.download_timeout_seconds)
            .field("export_timeout_seconds", &self.export_timeout_seconds)
            .field("download_root", &self.download_root)
            .field("diagnostics_dir", &self.diagnostics_dir)
            .finish()
    }
}

impl PortalConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }

    pub fn launch_options(&self) -> LaunchOptions {
        LaunchOptions {
            headless: self.headless,
            timeout: self.timeout(),
            chrome_path: self.chrome_path.clone(),
        }
    }

    /// Session options derived from this configuration, with the portal's
    /// default settle delays.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            home_url: self.url.clone(),
            timeout: self.timeout(),
            probe_timeout: Duration::from_secs(self.probe_timeout_seconds),
            download_timeout: Duration::from_secs(self.download_timeout_seconds),
            export_timeout: Duration::from_secs(self.export_timeout_seconds),
            download_root: self.download_root.clone(),
            diagnostics_dir: self.diagnostics_dir.clone(),
            ..SessionOptions::default()
        }
    }
}

pub(crate) fn load_portal_config() -> Result<PortalConfig> {
    match envy::prefixed("LINZNETZ_").from_env::<PortalConfig>() {
        Ok(config) => Ok(config),
        Err(err) => Err(anyhow!("Failed to load PortalConfig: {}", err)),
    }
}

fn default_days() -> u64 {
    7
}

#[derive(Deserialize, Debug)]
pub struct CollectorConfig {
    // how many days back from today to export
    #[serde(default = "default_days")]
    pub days: u64,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

impl CollectorConfig {
    /// Resolves the export window relative to `today`.
    ///
    /// Explicit dates win over `days`. The range is validated here because the
    /// portal session does not check it.
    pub fn date_range(&self, today: NaiveDate) -> Result<(PortalDate, PortalDate), ConfigError> {
        let to = match &self.to_date {
            Some(text) => parse_config_date("COLLECTOR_TO_DATE", text)?,
            None => PortalDate::from(today),
        };
        let from = match &self.from_date {
            Some(text) => parse_config_date("COLLECTOR_FROM_DATE", text)?,
            None => {
                let days = i64::try_from(self.days)
                    .map_err(|_| ConfigError::invalid("COLLECTOR_DAYS", "too large"))?;
                PortalDate::from(to.date() - DateDuration::days(days))
            }
        };

        if from > to {
            return Err(ConfigError::invalid(
                "COLLECTOR_FROM_DATE",
                format!("{} is after {}", from, to),
            ));
        }
        Ok((from, to))
    }
}

fn parse_config_date(field: &str, text: &str) -> Result<PortalDate, ConfigError> {
    text.parse::<PortalDate>()
        .map_err(|e| ConfigError::invalid(field, e.to_string()))
}

pub fn load_collector_config() -> Result<CollectorConfig> {
    match envy::prefixed("COLLECTOR_").from_env::<CollectorConfig>() {
        Ok(config) => Ok(config),
        Err(err) => Err(anyhow!("Failed to load CollectorConfig: {}", err)),
    }
}

#[derive(Deserialize, Debug)]
pub struct InfluxConfig {
    pub url: String,
    pub token: String,
    pub org: String,
    pub bucket: String,
}

pub fn load_influx_config() -> Result<InfluxConfig> {
    match envy::prefixed("INFLUXDB_").from_env::<InfluxConfig>() {
        Ok(config) => Ok(config),
        Err(err) => Err(anyhow!("Failed to load InfluxConfig: {}", err)),
    }
}
