use crate::config::InfluxConfig;
use crate::error::StorageError;
use futures::prelude::stream;
use influxdb2::models::DataPoint;

pub struct Client {
    client: influxdb2::Client,
    bucket: String,
}

impl Client {
    pub(crate) fn new(config: InfluxConfig) -> Self {
        let client = influxdb2::Client::new(config.url, config.org, config.token);
        Self {
            client,
            bucket: config.bucket,
        }
    }

    /// Writes one batch. Empty batches are not sent.
    pub async fn write(&self, points: Vec<DataPoint>) -> Result<(), StorageError> {
        if points.is_empty() {
            return Ok(());
        }
        let count = points.len();
        self.client
            .write(self.bucket.as_str(), stream::iter(points))
            .await?;
        tracing::debug!(bucket = self.bucket.as_str(), points = count, "Wrote points");
        Ok(())
    }
}
