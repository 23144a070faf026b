use crate::error::ParseError;
use crate::model::Resolution;
use chrono::{NaiveDate, NaiveDateTime};

const SEPARATOR: char = ';';

const DATETIME_FORMATS: &[&str] = &[
    "%d.%m.%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y"];

/// One line of a consumption export.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumptionReading {
    /// Start of the interval. Only quarter-hour exports carry it.
    pub from: Option<NaiveDateTime>,
    pub to: NaiveDateTime,
    pub kwh: f64,
    pub replacement_kwh: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedExport {
    pub resolution: Resolution,
    pub readings: Vec<ConsumptionReading>,
    /// Data lines that could not be parsed.
    pub skipped: usize,
}

/// Parses a portal CSV export.
///
/// The header decides the layout; malformed data lines are skipped and counted.
pub fn parse_consumption_csv(text: &str) -> Result<ParsedExport, ParseError> {
    let mut lines = text
        .trim_start_matches('\u{feff}')
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty());

    let header = lines.next().ok_or(ParseError::MissingHeader)?;
    let resolution = match header.split(SEPARATOR).count() {
        4 => Resolution::QuarterHour,
        3 => Resolution::Daily,
        _ => return Err(ParseError::UnexpectedColumns(header.to_string())),
    };
    if header
        .split(SEPARATOR)
        .next()
        .map(|first| first.trim().starts_with(|c: char| c.is_ascii_digit()))
        .unwrap_or(false)
    {
        return Err(ParseError::MissingHeader);
    }

    let mut readings = Vec::new();
    let mut skipped = 0;
    for (index, line) in lines.enumerate() {
        match parse_line(resolution, line) {
            Ok(reading) => readings.push(reading),
            Err(e) => {
                tracing::debug!(line = index + 2, error = %e, "Skipping invalid CSV line");
                skipped += 1;
            }
        }
    }

    Ok(ParsedExport {
        resolution,
        readings,
        skipped,
    })
}

fn parse_line(resolution: Resolution, line: &str) -> Result<ConsumptionReading, ParseError> {
    let columns: Vec<&str> = line.split(SEPARATOR).map(str::trim).collect();
    match (resolution, columns.as_slice()) {
        (Resolution::QuarterHour, [from, to, kwh, replacement]) => Ok(ConsumptionReading {
            from: Some(parse_timestamp(from)?),
            to: parse_timestamp(to)?,
            kwh: parse_kwh(kwh)?,
            replacement_kwh: parse_optional_kwh(replacement)?,
        }),
        (Resolution::QuarterHour, [from, to, kwh]) => Ok(ConsumptionReading {
            from: Some(parse_timestamp(from)?),
            to: parse_timestamp(to)?,
            kwh: parse_kwh(kwh)?,
            replacement_kwh: None,
        }),
        (Resolution::Daily, [date, kwh, replacement]) => Ok(ConsumptionReading {
            from: None,
            to: parse_timestamp(date)?,
            kwh: parse_kwh(kwh)?,
            replacement_kwh: parse_optional_kwh(replacement)?,
        }),
        (Resolution::Daily, [date, kwh]) => Ok(ConsumptionReading {
            from: None,
            to: parse_timestamp(date)?,
            kwh: parse_kwh(kwh)?,
            replacement_kwh: None,
        }),
        _ => Err(ParseError::UnexpectedColumns(line.to_string())),
    }
}

fn parse_timestamp(text: &str) -> Result<NaiveDateTime, ParseError> {
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(datetime);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Ok(date.and_time(chrono::NaiveTime::MIN));
        }
    }
    Err(ParseError::datetime_parse(text, "no matching format"))
}

fn parse_kwh(text: &str) -> Result<f64, ParseError> {
    text.replace(',', ".")
        .parse::<f64>()
        .map_err(|e| ParseError::number_parse(text, e))
}

fn parse_optional_kwh(text: &str) -> Result<Option<f64>, ParseError> {
    if text.is_empty() {
        Ok(None)
    } else {
        parse_kwh(text).map(Some)
    }
}
