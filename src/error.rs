//! Error types for the LinzNetz to InfluxDB2 forwarder.
//!
//! This module defines typed errors for the different components of the application.
//! Portal errors follow the session/export phases so that callers can tell a login
//! problem from a slow download without string matching.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using our custom error types.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error type that encompasses all application errors.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("configuration error")]
    Config(#[from] ConfigError),

    /// Portal session, navigation and export errors
    #[error("portal error")]
    Portal(#[from] PortalError),

    /// Export artifact parsing errors
    #[error("CSV parsing error")]
    Parse(#[from] ParseError),

    /// InfluxDB storage errors
    #[error("storage error")]
    Storage(#[from] StorageError),

    /// Generic errors that don't fit other categories
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration value is invalid
    #[error("invalid configuration value for {field}: {message}")]
    Invalid { field: String, message: String },
}

/// Failures reported by an interaction driver.
#[derive(Error, Debug)]
pub enum DriverError {
    /// The browser could not be started
    #[error("failed to launch browser: {0}")]
    Launch(String),

    /// A wait did not resolve in time
    #[error("timed out after {timeout:?} waiting for {target}")]
    Timeout { target: String, timeout: Duration },

    /// A query matched nothing
    #[error("no element matches {0}")]
    NotFound(String),

    /// Keyboard input was sent before any field was focused
    #[error("no element has focus")]
    NoFocus,

    /// The browser rejected or failed a command
    #[error("browser protocol error: {0}")]
    Protocol(String),

    /// Local I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<chromiumoxide::error::CdpError> for DriverError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        DriverError::Protocol(err.to_string())
    }
}

/// Session, navigation and export errors.
///
/// Every variant is terminal for the operation that raised it. None of them are
/// retried internally.
#[derive(Error, Debug)]
pub enum PortalError {
    /// A login element did not appear or could not be used
    #[error("authentication failed at '{element}'")]
    AuthenticationFailed {
        element: String,
        #[source]
        source: DriverError,
    },

    /// The consumption section could not be reached
    #[error("navigation failed at '{probe}'")]
    NavigationFailed {
        probe: String,
        #[source]
        source: DriverError,
    },

    /// The installation roster is missing data
    #[error("roster parse error{}: {message}", .row.map(|r| format!(" in row {}", r)).unwrap_or_default())]
    RosterParse { row: Option<usize>, message: String },

    /// No enumerated element carried the wanted text
    #[error("element not found: {selector} containing '{text}'")]
    ElementNotFound { selector: String, text: String },

    /// The results table did not show up after requesting results
    #[error("results table did not load")]
    ResultsLoadTimeout(#[source] DriverError),

    /// The whole export exceeded its deadline
    #[error("export did not finish within {0:?}")]
    ExportTimeout(Duration),

    /// No complete file arrived in the download directory
    #[error("no download arrived in {} within {timeout:?}", .directory.display())]
    DownloadTimeout { directory: PathBuf, timeout: Duration },

    /// More than one finished file landed in an export directory
    #[error("ambiguous export in {}: {}", .directory.display(), .files.join(", "))]
    AmbiguousArtifact { directory: PathBuf, files: Vec<String> },

    /// Driver failure outside the named phases
    #[error("driver error")]
    Driver(#[from] DriverError),

    /// Download channel I/O failure
    #[error("download channel error")]
    Download(#[from] std::io::Error),

    /// Teardown failed after another error had already happened
    #[error("{original} (teardown also failed: {teardown})")]
    WithTeardownFailure {
        #[source]
        original: Box<PortalError>,
        teardown: DriverError,
    },
}

/// Export artifact (CSV) parsing errors.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The artifact has no header line
    #[error("export has no header line")]
    MissingHeader,

    /// The header does not describe a known export layout
    #[error("unexpected column layout: {0}")]
    UnexpectedColumns(String),

    /// Failed to parse numeric value
    #[error("failed to parse number from '{text}': {message}")]
    NumberParse { text: String, message: String },

    /// Failed to parse date/time
    #[error("failed to parse date/time from '{text}': {message}")]
    DateTimeParse { text: String, message: String },
}

/// InfluxDB storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// InfluxDB client error
    #[error("InfluxDB error: {0}")]
    Client(#[from] influxdb2::RequestError),

    /// Invalid data point
    #[error("invalid data point: {0}")]
    InvalidDataPoint(String),
}

impl ConfigError {
    /// Creates a new invalid configuration error.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl PortalError {
    /// Creates an authentication error for the given login element.
    pub fn authentication_failed(element: impl Into<String>, source: DriverError) -> Self {
        Self::AuthenticationFailed {
            element: element.into(),
            source,
        }
    }

    /// Creates a navigation error for the given probe.
    pub fn navigation_failed(probe: impl Into<String>, source: DriverError) -> Self {
        Self::NavigationFailed {
            probe: probe.into(),
            source,
        }
    }

    /// Creates a roster error for one row.
    pub fn roster_row(row: usize, message: impl Into<String>) -> Self {
        Self::RosterParse {
            row: Some(row),
            message: message.into(),
        }
    }

    /// Creates a roster error that is not tied to a row.
    pub fn roster(message: impl Into<String>) -> Self {
        Self::RosterParse {
            row: None,
            message: message.into(),
        }
    }

    /// Creates an element not found error.
    pub fn element_not_found(selector: impl Into<String>, text: impl Into<String>) -> Self {
        Self::ElementNotFound {
            selector: selector.into(),
            text: text.into(),
        }
    }

    /// Attaches a teardown failure while keeping this error first.
    pub fn with_teardown_failure(self, teardown: DriverError) -> Self {
        Self::WithTeardownFailure {
            original: Box::new(self),
            teardown,
        }
    }

    /// Returns the error that started the failure, skipping teardown wrappers.
    pub fn original(&self) -> &PortalError {
        match self {
            Self::WithTeardownFailure { original, .. } => original.original(),
            other => other,
        }
    }
}

impl ParseError {
    /// Creates a number parse error.
    pub fn number_parse(text: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::NumberParse {
            text: text.into(),
            message: err.to_string(),
        }
    }

    /// Creates a datetime parse error.
    pub fn datetime_parse(text: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::DateTimeParse {
            text: text.into(),
            message: err.to_string(),
        }
    }
}
