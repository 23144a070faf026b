use crate::consumption::ConsumptionReading;
use crate::error::{Result, StorageError};
use crate::portal::MeterPointId;
use chrono::{Local, NaiveDateTime, TimeZone};
use influxdb2::models::DataPoint;

use super::traits::DataPointBuilder;
use super::types::{Measurement, Resolution};

/// One metered interval of one installation.
///
/// The point is stamped with the end of the interval, read as local time.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumptionMetric {
    /// The measurement type (should be Measurement::KwhConsumption)
    pub measurement: Measurement,
    pub resolution: Resolution,
    /// Installation display name, stored as `location`
    pub location: String,
    pub meter_point: MeterPointId,
    pub reading: ConsumptionReading,
}

impl ConsumptionMetric {
    pub fn new(
        resolution: Resolution,
        location: impl Into<String>,
        meter_point: MeterPointId,
        reading: ConsumptionReading,
    ) -> Self {
        Self {
            measurement: Measurement::KwhConsumption,
            resolution,
            location: location.into(),
            meter_point,
            reading,
        }
    }
}

impl DataPointBuilder for ConsumptionMetric {
    fn to_point(&self) -> Result<DataPoint, StorageError> {
        let timestamp = local_timestamp_nanos(self.reading.to)?;

        let mut builder = DataPoint::builder(self.measurement.to_string().as_str())
            .tag("precision", self.resolution.to_string())
            .tag("location", self.location.clone())
            .tag("meter_point", self.meter_point.to_string())
            .field("value", self.reading.kwh);
        if let Some(replacement) = self.reading.replacement_kwh {
            builder = builder.field("replacement_value", replacement);
        }

        builder.timestamp(timestamp).build().map_err(|e| {
            StorageError::InvalidDataPoint(format!("Failed to build ConsumptionMetric: {}", e))
        })
    }
}

fn local_timestamp_nanos(datetime: NaiveDateTime) -> Result<i64, StorageError> {
    // the earlier instant wins when the clock is turned back
    let local = Local
        .from_local_datetime(&datetime)
        .earliest()
        .ok_or_else(|| {
            StorageError::InvalidDataPoint(format!("{} does not exist in local time", datetime))
        })?;
    local
        .timestamp_nanos_opt()
        .ok_or_else(|| StorageError::InvalidDataPoint("Timestamp overflow".to_string()))
}
