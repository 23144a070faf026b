//! Parsing of the consumption CSV the portal exports.

pub mod csv;

pub use csv::{parse_consumption_csv, ConsumptionReading};
