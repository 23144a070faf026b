use crate::error::{Result, StorageError};
use influxdb2::models::DataPoint;

/// Trait for types that can be converted to InfluxDB data points.
///
/// Implementors must be thread-safe (Send + Sync) so that batches can be
/// handed to the writer task.
pub trait DataPointBuilder: Send + Sync {
    /// Converts the metric into an InfluxDB DataPoint.
    ///
    /// # Returns
    /// - `Ok(DataPoint)` if conversion succeeds
    /// - `Err` if the metric data cannot be converted to a valid DataPoint
    fn to_point(&self) -> Result<DataPoint, StorageError>;
}
