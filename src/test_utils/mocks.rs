//! Mock implementations and server helpers for testing.

use crate::error::{Result, StorageError};
use crate::model::DataPointBuilder;
use influxdb2::models::DataPoint;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Metric whose conversion always fails.
pub struct FailingDataPointBuilder;

impl DataPointBuilder for FailingDataPointBuilder {
    fn to_point(&self) -> Result<DataPoint, StorageError> {
        Err(StorageError::InvalidDataPoint(
            "Mock conversion failure".to_string(),
        ))
    }
}

/// Builder for a wiremock server standing in for the InfluxDB write API.
///
/// Expectations are verified when the builder is dropped.
pub struct MockInfluxServerBuilder {
    server: MockServer,
}

impl MockInfluxServerBuilder {
    /// Creates a new mock InfluxDB server builder.
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Gets the server URL.
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Answers writes with `status` and expects exactly `times` of them.
    pub async fn expect_write(self, status: u16, times: u64) -> Self {
        Mock::given(method("POST"))
            .and(path("/api/v2/write"))
            .respond_with(ResponseTemplate::new(status).set_body_string("mock response"))
            .expect(times)
            .mount(&self.server)
            .await;
        self
    }
}
