//! Quarter-hour CSV export for one installation and date range.

use crate::error::{DriverError, PortalError};
use crate::portal::download::DownloadChannel;
use crate::portal::driver::Driver;
use crate::portal::navigation::find_element_by_text;
use crate::portal::roster::{Installation, MeterPointId};
use crate::portal::selectors;
use crate::portal::session::SessionOptions;
use crate::portal::watcher::FileArrivalWatcher;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Date in the portal's `dd.MM.yyyy` notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortalDate(NaiveDate);

impl PortalDate {
    pub const FORMAT: &'static str = "%d.%m.%Y";

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for PortalDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl FromStr for PortalDate {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), Self::FORMAT).map(Self)
    }
}

impl fmt::Display for PortalDate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub installation: Installation,
    pub from: PortalDate,
    pub to: PortalDate,
}

impl ExportRequest {
    pub fn new(installation: Installation, from: PortalDate, to: PortalDate) -> Self {
        Self {
            installation,
            from,
            to,
        }
    }
}

/// The exported file exactly as the portal produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    meter_point: MeterPointId,
    file_name: String,
    bytes: Vec<u8>,
}

impl ExportArtifact {
    pub fn meter_point(&self) -> &MeterPointId {
        &self.meter_point
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Runs one export, always releasing its download directory afterwards.
///
/// The export error wins over a cleanup error; the latter is only logged.
pub(crate) async fn run_export<D: Driver>(
    driver: &D,
    channel: &mut DownloadChannel,
    options: &SessionOptions,
    request: &ExportRequest,
) -> Result<ExportArtifact, PortalError> {
    let dir = channel.arm(driver).await?;

    let outcome = match tokio::time::timeout(
        options.export_timeout,
        drive_export(driver, options, request, &dir),
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(_) => {
            // the deadline may have cut a date entry short while scripts were off
            if let Err(e) = driver.set_script_execution(true).await {
                tracing::warn!(error = %e, "Failed to resume page scripts after export timeout");
            }
            Err(PortalError::ExportTimeout(options.export_timeout))
        }
    };

    let cleanup = channel.disarm(driver, dir).await;

    match (outcome, cleanup) {
        (Ok(artifact), Ok(())) => Ok(artifact),
        (Ok(_), Err(e)) => Err(e.into()),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(cleanup)) => {
            tracing::warn!(error = %cleanup, "Failed to release download directory after failed export");
            Err(e)
        }
    }
}

async fn drive_export<D: Driver>(
    driver: &D,
    options: &SessionOptions,
    request: &ExportRequest,
    dir: &crate::portal::download::ExportDir,
) -> Result<ExportArtifact, PortalError> {
    let installation = &request.installation;
    tracing::info!(
        installation = installation.name(),
        meter_point = %installation.meter_point(),
        from = %request.from,
        to = %request.to,
        "Exporting consumption"
    );

    driver
        .click_selector(
            &selectors::installation_label(installation.handle().as_str()),
            options.probe_timeout,
        )
        .await?;
    tokio::time::sleep(options.settle).await;

    let resolution =
        find_element_by_text(driver, selectors::RESOLUTION_LABELS, selectors::QUARTER_HOUR_LABEL)
            .await?;
    driver.click(&resolution).await?;
    tokio::time::sleep(options.settle).await;

    set_date(driver, selectors::FROM_DATE_FIELD, &request.from).await?;
    tokio::time::sleep(options.settle).await;
    set_date(driver, selectors::TO_DATE_FIELD, &request.to).await?;
    tokio::time::sleep(options.settle).await;

    driver
        .click_selector(
            &selectors::by_id(selectors::LOAD_RESULTS_BUTTON),
            options.probe_timeout,
        )
        .await?;
    driver
        .wait_for_selector(selectors::RESULTS_TABLE, options.timeout)
        .await
        .map_err(PortalError::ResultsLoadTimeout)?;

    let csv = find_element_by_text(driver, selectors::EXPORT_ANCHORS, selectors::CSV_EXPORT_LABEL)
        .await?;
    driver.click(&csv).await?;

    let arrived = FileArrivalWatcher::new(options.download_timeout)
        .with_poll_interval(options.poll_interval)
        .wait(dir.path())
        .await?;

    tracing::info!(
        meter_point = %installation.meter_point(),
        file = arrived.file_name.as_str(),
        bytes = arrived.bytes.len(),
        "Export downloaded"
    );
    Ok(ExportArtifact {
        meter_point: installation.meter_point().clone(),
        file_name: arrived.file_name,
        bytes: arrived.bytes,
    })
}

/// Replaces the content of a date input without triggering the page's
/// on-change handlers while typing.
async fn set_date<D: Driver>(driver: &D, field: &str, date: &PortalDate) -> Result<(), DriverError> {
    driver.focus(&selectors::by_id(field)).await?;

    let length = driver
        .evaluate(&selectors::value_length_script(field))
        .await?
        .as_u64()
        .unwrap_or(0) as usize;
    driver.press_key("End").await?;
    for _ in 0..length.max(10) {
        driver.press_key("Backspace").await?;
    }

    driver.set_script_execution(false).await?;
    let typed = driver.type_text(&date.to_string()).await;
    let resumed = driver.set_script_execution(true).await;
    typed?;
    resumed?;

    driver.evaluate(&selectors::blur_script(field)).await?;
    Ok(())
}
