//! Selectors, XPaths and labels used against the LinzNetz portal.

pub const LOGIN_LINK: &str = ".netz-login-link";
pub const USERNAME_FIELD: &str = "#username";
pub const PASSWORD_FIELD: &str = "#password";
pub const LOGIN_SUBMIT: &str = "form .netz-btn--primary";

/// Heading that marks the consumption page as rendered.
pub const CONSUMPTION_HEADING: &str = "h1";

/// Link labels on the way to the consumption page, one entry per click.
/// Each entry lists the label variants the portal has used, newest first.
pub const CONSUMPTION_LINKS: &[&[&str]] = &[
    &["Verbrauchsdateninformation"],
    &["Meine Verbräuche anzeigen"],
];

pub const ROSTER_LEGEND: &str = "#myform > fieldset > legend";
pub const ROSTER_ROWS: &str = "#myform .netz-fieldset-inner .row";
pub const ROW_NAME: &str = ".netz-label-radio b";
pub const ROW_COLUMNS: &str = "div[class*='col-']";
pub const ROW_METER_POINT: &str = "span.netz-word-break";
pub const ROW_RADIO: &str = "input.netz-radio";
pub const METER_SERIAL_MARKER: &str = "Zählernummer";

pub const RESOLUTION_LABELS: &str = "label";
pub const QUARTER_HOUR_LABEL: &str = "Viertelstundenwerte";

pub const FROM_DATE_FIELD: &str = "myForm1:calendarFromRegion";
pub const TO_DATE_FIELD: &str = "myForm1:calendarToRegion";
pub const LOAD_RESULTS_BUTTON: &str = "myForm1:btnIdA1";
pub const RESULTS_TABLE: &str = ".netz-table-export";

pub const EXPORT_ANCHORS: &str = "span.netz-anchor-text";
pub const CSV_EXPORT_LABEL: &str = "CSV-Datei exportieren";

/// CSS selector for an element id. Colons in JSF ids must be escaped.
pub fn by_id(id: &str) -> String {
    format!("#{}", id.replace(':', "\\:"))
}

/// CSS selector for the label that selects the installation with `handle`.
pub fn installation_label(handle: &str) -> String {
    format!("label[for=\"{}\"]", handle)
}

/// XPath for an anchor whose text contains `label`.
pub fn link_xpath(label: &str) -> String {
    if label.contains('\'') {
        format!("//a[contains(., \"{}\")]", label)
    } else {
        format!("//a[contains(., '{}')]", label)
    }
}

/// Script returning the current value length of the input with `id`.
pub fn value_length_script(id: &str) -> String {
    format!("document.getElementById('{}').value.length", id)
}

/// Script that removes focus from the input with `id`.
pub fn blur_script(id: &str) -> String {
    format!("document.getElementById('{}').blur()", id)
}
