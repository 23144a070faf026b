use std::fmt;

/// InfluxDB measurement the forwarder writes to.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Measurement {
    /// Metered energy per interval
    KwhConsumption,
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Measurement::KwhConsumption => write!(f, "kwh_consumption"),
        }
    }
}

/// Interval length of an export.
///
/// Stored as the `precision` tag so quarter-hour and daily series stay apart.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Resolution {
    QuarterHour,
    Daily,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Resolution::QuarterHour => write!(f, "quarterhour"),
            Resolution::Daily => write!(f, "daily"),
        }
    }
}
