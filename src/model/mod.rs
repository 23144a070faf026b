//! Model definitions for consumption metrics and InfluxDB data points.
//!
//! This module turns parsed export readings into InfluxDB data points.

pub mod metrics;
pub mod traits;
pub mod types;
pub mod utilities;

// Re-export commonly used items at the module level
pub use metrics::ConsumptionMetric;
pub use traits::DataPointBuilder;
pub use types::{Measurement, Resolution};
pub use utilities::to_points;
