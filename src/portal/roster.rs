//! Installation roster of a portal account.
//!
//! The consumption page lists one row per meter location ("Anlage"). Each row
//! must yield a name, the meter serial, the meter-point identifier and the id of
//! the radio control used to select it. A row missing any of the four fails the
//! whole roster.

use crate::error::PortalError;
use crate::portal::selectors;
use scraper::{ElementRef, Html, Selector};
use std::fmt;

/// Length of a canonical Austrian meter-point identifier.
pub const CANONICAL_METER_POINT_LEN: usize = 33;

/// Meter-point identifier ("Zählpunktnummer"): `AT` followed by digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MeterPointId(String);

impl MeterPointId {
    /// Validates `value` as a meter-point identifier.
    ///
    /// Identifiers with a non-canonical length are accepted and logged.
    pub fn parse(value: &str) -> Result<Self, String> {
        let digits = value
            .strip_prefix("AT")
            .ok_or_else(|| format!("meter-point identifier '{}' does not start with AT", value))?;
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!(
                "meter-point identifier '{}' must continue with digits only",
                value
            ));
        }
        let id = Self(value.to_string());
        if !id.is_canonical() {
            tracing::warn!(
                meter_point = value,
                len = value.len(),
                "Meter-point identifier has non-canonical length"
            );
        }
        Ok(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_canonical(&self) -> bool {
        self.0.len() == CANONICAL_METER_POINT_LEN
    }
}

impl fmt::Display for MeterPointId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Id of the portal control that selects an installation.
///
/// Only meaningful inside the session that parsed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionHandle(String);

impl SelectionHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One meter location registered under the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    name: String,
    meter_serial: String,
    meter_point: MeterPointId,
    handle: SelectionHandle,
}

impl Installation {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meter_serial(&self) -> &str {
        &self.meter_serial
    }

    pub fn meter_point(&self) -> &MeterPointId {
        &self.meter_point
    }

    pub fn handle(&self) -> &SelectionHandle {
        &self.handle
    }
}

impl fmt::Display for Installation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} (Zählernummer {}, Zählpunkt {})",
            self.name, self.meter_serial, self.meter_point
        )
    }
}

/// Base info of the account: address label plus installations in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    pub address: String,
    pub installations: Vec<Installation>,
}

impl Roster {
    pub fn len(&self) -> usize {
        self.installations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.installations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Installation> {
        self.installations.iter()
    }
}

/// Parses the base info and installation rows from consumption page markup.
pub fn parse_roster(html: &str) -> Result<Roster, PortalError> {
    let document = Html::parse_document(html);

    let legend_selector = selector(selectors::ROSTER_LEGEND)?;
    let address = document
        .select(&legend_selector)
        .next()
        .map(|legend| collapse_whitespace(&element_text(&legend)))
        .ok_or_else(|| PortalError::roster("address legend not found"))?;

    let row_selector = selector(selectors::ROSTER_ROWS)?;
    let installations = document
        .select(&row_selector)
        .enumerate()
        .map(|(index, row)| parse_row(index, row))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Roster {
        address,
        installations,
    })
}

fn parse_row(index: usize, row: ElementRef) -> Result<Installation, PortalError> {
    let name = first_text(&row, selectors::ROW_NAME)?
        .filter(|name| !name.is_empty())
        .ok_or_else(|| PortalError::roster_row(index, "missing installation name"))?;

    let meter_serial = parse_meter_serial(&row)?
        .ok_or_else(|| PortalError::roster_row(index, "missing meter serial"))?;

    let meter_point_text = first_text(&row, selectors::ROW_METER_POINT)?
        .filter(|text| !text.is_empty())
        .ok_or_else(|| PortalError::roster_row(index, "missing meter-point identifier"))?;
    let meter_point =
        MeterPointId::parse(&meter_point_text).map_err(|e| PortalError::roster_row(index, e))?;

    let radio_selector = selector(selectors::ROW_RADIO)?;
    let handle = row
        .select(&radio_selector)
        .next()
        .and_then(|radio| radio.value().attr("id"))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| SelectionHandle(id.to_string()))
        .ok_or_else(|| PortalError::roster_row(index, "missing selection control id"))?;

    Ok(Installation {
        name,
        meter_serial,
        meter_point,
        handle,
    })
}

/// Finds the column carrying the serial marker and returns the first text line
/// after the marker that starts with a digit.
fn parse_meter_serial(row: &ElementRef) -> Result<Option<String>, PortalError> {
    let column_selector = selector(selectors::ROW_COLUMNS)?;
    let column = row
        .select(&column_selector)
        .find(|column| element_text(column).contains(selectors::METER_SERIAL_MARKER));

    Ok(column.and_then(|column| {
        column
            .text()
            .flat_map(str::lines)
            .map(str::trim)
            .filter(|line| !line.contains(selectors::METER_SERIAL_MARKER))
            .find(|line| line.starts_with(|c: char| c.is_ascii_digit()))
            .map(str::to_string)
    }))
}

fn first_text(row: &ElementRef, css: &str) -> Result<Option<String>, PortalError> {
    let selector = selector(css)?;
    Ok(row
        .select(&selector)
        .next()
        .map(|element| element_text(&element).trim().to_string()))
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn selector(css: &str) -> Result<Selector, PortalError> {
    Selector::parse(css)
        .map_err(|e| PortalError::roster(format!("invalid selector '{}': {}", css, e)))
}
