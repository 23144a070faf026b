//! Configuration utilities for testing.

use crate::config::{InfluxConfig, PortalConfig};

use super::fixtures::constants::{TEST_PASSWORD, TEST_USERNAME};

/// Builder for creating test portal configurations.
#[derive(Debug)]
pub struct TestPortalConfigBuilder {
    username: String,
    password: String,
    url: String,
}

impl TestPortalConfigBuilder {
    /// Creates a new test config builder with default values.
    pub fn new() -> Self {
        Self {
            username: TEST_USERNAME.to_string(),
            password: TEST_PASSWORD.to_string(),
            url: "http://portal.test/portal/de/home".to_string(),
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Builds the portal configuration with default timeouts.
    pub fn build(self) -> PortalConfig {
        PortalConfig {
            username: self.username,
            password: self.password,
            url: self.url,
            timeout_seconds: 120,
            headless: true,
            chrome_path: None,
            probe_timeout_seconds: 15,
            download_timeout_seconds: 30,
            export_timeout_seconds: 300,
            download_root: None,
            diagnostics_dir: None,
        }
    }
}

/// Builder for creating test InfluxDB configurations.
#[derive(Debug)]
pub struct TestInfluxConfigBuilder {
    url: String,
    org: String,
    token: String,
    bucket: String,
}

impl TestInfluxConfigBuilder {
    /// Creates a new test config builder with default values.
    pub fn new() -> Self {
        Self {
            url: "http://localhost:8086".to_string(),
            org: "home".to_string(),
            token: "test-token".to_string(),
            bucket: "linzstrom".to_string(),
        }
    }

    /// Sets the URL for the test configuration.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Builds the InfluxDB configuration.
    pub fn build(self) -> InfluxConfig {
        InfluxConfig {
            url: self.url,
            org: self.org,
            token: self.token,
            bucket: self.bucket,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portal_config_builder() {
        let config = TestPortalConfigBuilder::new()
            .with_url("http://portal.local")
            .with_password("secret")
            .build();

        assert_eq!(config.url, "http://portal.local");
        assert_eq!(config.password, "secret");
        assert_eq!(config.username, TEST_USERNAME);
        assert_eq!(config.session_options().home_url, "http://portal.local");
    }

    #[test]
    fn test_influx_config_builder() {
        let config = TestInfluxConfigBuilder::new()
            .with_url("http://influx.local")
            .build();

        assert_eq!(config.url, "http://influx.local");
        assert_eq!(config.org, "home");
        assert_eq!(config.bucket, "linzstrom");
    }
}
