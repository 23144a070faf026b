use influxdb2::models::DataPoint;

use super::traits::DataPointBuilder;

/// Converts metrics to InfluxDB data points.
///
/// Metrics that fail to convert are logged and left out; the rest of the batch
/// is still returned.
pub fn to_points<B: DataPointBuilder>(metrics: &[B]) -> Vec<DataPoint> {
    metrics
        .iter()
        .filter_map(|metric| match metric.to_point() {
            Ok(point) => Some(point),
            Err(e) => {
                tracing::error!("Failed to convert to point: {:?}", e);
                None
            }
        })
        .collect()
}
