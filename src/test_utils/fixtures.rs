//! Test fixtures and common test data.
//!
//! Portal pages are rendered from [`RowFixture`]s so that roster parsing and the
//! fake portal share one markup.

use crate::portal::roster::parse_roster;
use crate::portal::{selectors, Installation};

/// Common test data constants.
pub mod constants {
    pub const TEST_USERNAME: &str = "u@example.com";
    pub const TEST_PASSWORD: &str = "pw";

    pub const TEST_ADDRESS: &str = "1234 Musterstadt, Beispielstraße 1";

    /// Canonical 33-character identifiers.
    pub const TEST_METER_POINTS: &[&str] = &[
        "AT0030000000000000000000000000001",
        "AT0030000000000000000000000000002",
        "AT0030000000000000000000000000003",
    ];

    pub const TEST_SERIALS: &[&str] = &["12345678", "23456789", "34567890"];

    /// Identifier used by the end-to-end scenario. Longer than canonical.
    pub const SCENARIO_METER_POINT: &str = "AT0030000000000000000000000000000001";
}

/// Exports as the portal delivers them.
pub mod csv {
    pub const QUARTER_HOUR: &str = "Von;Bis;Verbrauch in kWh;Ersatzwert in kWh\n\
19.02.2022 00:00;19.02.2022 00:15;0,138;\n\
19.02.2022 00:15;19.02.2022 00:30;0,142;\n\
25.02.2022 23:45;26.02.2022 00:00;0,137;0,200\n";

    pub const DAILY: &str = "Datum;Verbrauch in kWh;Ersatzwert in kWh\n\
2025-12-28;1,234;\n\
2025-12-29;2,567;3,000\n";

    pub const HEADER_ONLY: &str = "Von;Bis;Verbrauch in kWh;Ersatzwert in kWh\n";
}

/// One installation row of the consumption page.
#[derive(Debug, Clone)]
pub struct RowFixture {
    pub name: String,
    pub serial: String,
    pub meter_point: String,
    pub handle: String,
}

impl RowFixture {
    pub fn new(name: &str, serial: &str, meter_point: &str, handle: &str) -> Self {
        Self {
            name: name.to_string(),
            serial: serial.to_string(),
            meter_point: meter_point.to_string(),
            handle: handle.to_string(),
        }
    }

    fn render(&self) -> String {
        format!(
            r#"
            <div class="row">
              <div class="col-md-1"><input type="radio" class="netz-radio" name="plant" id="{handle}"></div>
              <div class="col-md-4"><label class="netz-label-radio" for="{handle}"><b>{name}</b></label></div>
              <div class="col-md-3">Zählernummer<br>
                {serial}</div>
              <div class="col-md-4">Zählpunkt<br><span class="netz-word-break">{meter_point}</span></div>
            </div>"#,
            handle = self.handle,
            name = self.name,
            serial = self.serial,
            meter_point = self.meter_point,
        )
    }
}

/// Row used when a test only needs one valid installation.
pub fn basic_row() -> RowFixture {
    RowFixture::new(
        "Basisanlage",
        constants::TEST_SERIALS[0],
        constants::TEST_METER_POINTS[0],
        "plant-100001",
    )
}

/// The installation parsed from [`basic_row`].
pub fn basic_installation() -> Installation {
    parse_roster(&consumption_page(&[basic_row()], false))
        .unwrap()
        .installations
        .remove(0)
}

pub fn home_page() -> String {
    r#"<html><body><header><a class="netz-login-link" href="/login">Login</a></header></body></html>"#
        .to_string()
}

pub fn login_page() -> String {
    r#"<html><body><form action="/login" method="post">
        <input id="username" name="username" type="text">
        <input id="password" name="password" type="password">
        <button class="netz-btn--primary" type="submit">Anmelden</button>
    </form></body></html>"#
        .to_string()
}

pub fn dashboard_page() -> String {
    r#"<html><body><nav><a href="/verbrauch">Verbrauchsdateninformation</a></nav></body></html>"#
        .to_string()
}

pub fn menu_page() -> String {
    r#"<html><body><nav><a href="/verbrauch/anzeigen">Meine Verbräuche anzeigen</a></nav></body></html>"#
        .to_string()
}

/// Consumption page with the roster and the export controls.
pub fn consumption_page(rows: &[RowFixture], results_loaded: bool) -> String {
    let rows: String = rows.iter().map(RowFixture::render).collect();
    let results = if results_loaded {
        format!(
            r##"<table class="netz-table-export"><tr><td>0,138</td></tr></table>
            <a href="#"><span class="netz-anchor-text">PDF-Datei exportieren</span></a>
            <a href="#"><span class="netz-anchor-text">{}</span></a>"##,
            selectors::CSV_EXPORT_LABEL
        )
    } else {
        String::new()
    };
    format!(
        r#"<html><body><h1>Verbrauchsdateninformation</h1>
        <form id="myform"><fieldset><legend>
            {address}
        </legend><div class="netz-fieldset-inner">{rows}</div></fieldset></form>
        <form id="myForm1">
          <label>Tageswerte</label>
          <label>{quarter_hour}</label>
          <input id="{from}" type="text" value="01.12.2024">
          <input id="{to}" type="text" value="08.12.2024">
          <button id="{load}" type="button">Anzeigen</button>
        </form>
        {results}
        </body></html>"#,
        address = constants::TEST_ADDRESS,
        rows = rows,
        quarter_hour = selectors::QUARTER_HOUR_LABEL,
        from = selectors::FROM_DATE_FIELD,
        to = selectors::TO_DATE_FIELD,
        load = selectors::LOAD_RESULTS_BUTTON,
        results = results,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        for id in constants::TEST_METER_POINTS {
            assert_eq!(id.len(), 33);
        }
        assert_eq!(constants::SCENARIO_METER_POINT.len(), 36);
    }

    #[test]
    fn test_basic_installation() {
        let installation = basic_installation();
        assert_eq!(installation.name(), "Basisanlage");
        assert_eq!(installation.handle().as_str(), "plant-100001");
    }

    #[test]
    fn test_consumption_page_shows_results_on_demand() {
        assert!(!consumption_page(&[], false).contains("netz-table-export"));
        assert!(consumption_page(&[], true).contains(selectors::CSV_EXPORT_LABEL));
    }
}
