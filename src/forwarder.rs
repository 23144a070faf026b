//! Exports every installation of a session and writes the readings to InfluxDB.

use crate::consumption::parse_consumption_csv;
use crate::error::Error;
use crate::influxdb;
use crate::model::{to_points, ConsumptionMetric};
use crate::portal::{Driver, ExportRequest, Installation, MeterPointId, PortalDate, Session};

#[derive(Debug)]
pub struct ForwardedInstallation {
    pub name: String,
    pub meter_point: MeterPointId,
    pub points: usize,
    pub skipped: usize,
}

#[derive(Debug)]
pub struct FailedInstallation {
    pub name: String,
    pub meter_point: MeterPointId,
    pub error: Error,
}

/// Outcome of one run, per installation in roster order.
#[derive(Debug, Default)]
pub struct ForwardSummary {
    pub forwarded: Vec<ForwardedInstallation>,
    pub failed: Vec<FailedInstallation>,
}

impl ForwardSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Forwards `from..=to` for every installation of `session`.
///
/// A failing installation is recorded and the run continues with the next one.
pub async fn forward_consumption<D: Driver>(
    session: &mut Session<D>,
    influx_client: &influxdb::Client,
    from: PortalDate,
    to: PortalDate,
) -> ForwardSummary {
    let roster = session.roster().clone();
    tracing::info!(address = roster.address.as_str(), "Base info");
    for installation in roster.iter() {
        tracing::info!("Installation: {}", installation);
    }

    let mut summary = ForwardSummary::default();
    for installation in roster.iter() {
        let request = ExportRequest::new(installation.clone(), from, to);
        match forward_installation(session, influx_client, &request).await {
            Ok(forwarded) => {
                tracing::info!(
                    installation = installation.name(),
                    points = forwarded.points,
                    skipped = forwarded.skipped,
                    "Successfully wrote points to InfluxDB"
                );
                summary.forwarded.push(forwarded);
            }
            Err(e) => {
                tracing::error!(
                    installation = installation.name(),
                    "Failed to forward consumption: {:?}",
                    e
                );
                summary.failed.push(FailedInstallation {
                    name: installation.name().to_string(),
                    meter_point: installation.meter_point().clone(),
                    error: e,
                });
            }
        }
    }

    tracing::info!(
        forwarded = summary.forwarded.len(),
        failed = summary.failed.len(),
        "Finished forwarding {} to {}",
        from,
        to
    );
    summary
}

async fn forward_installation<D: Driver>(
    session: &mut Session<D>,
    influx_client: &influxdb::Client,
    request: &ExportRequest,
) -> Result<ForwardedInstallation, Error> {
    let installation: &Installation = &request.installation;
    let artifact = session.export(request).await?;
    let parsed = parse_consumption_csv(&artifact.text())?;

    let forwarded = |points| ForwardedInstallation {
        name: installation.name().to_string(),
        meter_point: installation.meter_point().clone(),
        points,
        skipped: parsed.skipped,
    };

    if parsed.readings.is_empty() {
        tracing::warn!(
            installation = installation.name(),
            "No valid records, skipping"
        );
        return Ok(forwarded(0));
    }

    let metrics: Vec<ConsumptionMetric> = parsed
        .readings
        .iter()
        .cloned()
        .map(|reading| {
            ConsumptionMetric::new(
                parsed.resolution,
                installation.name(),
                installation.meter_point().clone(),
                reading,
            )
        })
        .collect();
    let points = to_points(&metrics);
    let count = points.len();
    influx_client.write(points).await?;
    Ok(forwarded(count))
}
