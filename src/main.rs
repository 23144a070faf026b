//! LinzNetz to InfluxDB2 Forwarder
//!
//! This application logs into the LinzNetz customer portal, exports the
//! quarter-hour consumption of every meter location registered under the
//! account and forwards the readings to InfluxDB2.
//!
//! # Flow
//!
//! - Start a portal session (browser launch, login, roster)
//! - Export each installation for the configured date range
//! - Parse the CSV export and write one batch per installation
//! - Close the session
//!
//! The process exits non-zero if the session could not be started or any
//! installation failed. SIGTERM/SIGINT abort the run and tear the browser down.

mod config;
mod consumption;
mod error;
mod forwarder;
mod influxdb;
mod model;
mod portal;

#[cfg(test)]
mod test_utils;

use crate::forwarder::ForwardSummary;
use crate::portal::{Credentials, LaunchOptions, PortalDate, Session, SessionOptions};
use anyhow::{Context, Result};
use chrono::Local;
use std::process::ExitCode;
use tokio::signal::ctrl_c;
use tokio::signal::unix::{signal, SignalKind};

/// Application entry point.
#[tokio::main]
async fn main() -> ExitCode {
    let app_config = config::load_app_config().expect("Failed to load AppConfig");
    tracing_subscriber::fmt()
        .with_max_level(app_config.log_level())
        .init();

    match run().await {
        Ok(summary) => ExitCode::from(exit_status(&summary)),
        Err(e) => {
            tracing::error!("{:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ForwardSummary> {
    let portal_config = config::load_portal_config()?;
    let collector_config = config::load_collector_config()?;
    let (from, to) = collector_config
        .date_range(Local::now().date_naive())
        .context("Invalid collector date range")?;
    let influx_client = influxdb::Client::new(config::load_influx_config()?);

    let mut sig_term = signal(SignalKind::terminate()).context("Failed to register SIGTERM handler")?;
    tracing::info!("Running... Press Ctrl-C or send SIGTERM to terminate.");

    let forward = forward(
        portal_config.credentials(),
        portal_config.launch_options(),
        portal_config.session_options(),
        &influx_client,
        from,
        to,
    );
    tokio::select! {
        // Handle SIGTERM for graceful shutdown in containers
        _ = sig_term.recv() => {
            tracing::info!("Received SIGTERM. Exiting...");
            anyhow::bail!("interrupted by SIGTERM")
        }
        // Handle Ctrl-C for manual termination
        _ = ctrl_c() => {
            tracing::info!("Received SIGINT. Exiting...");
            anyhow::bail!("interrupted by SIGINT")
        }
        result = forward => result,
    }
}

/// Runs one session from launch to close.
async fn forward(
    credentials: Credentials,
    launch: LaunchOptions,
    options: SessionOptions,
    influx_client: &influxdb::Client,
    from: PortalDate,
    to: PortalDate,
) -> Result<ForwardSummary> {
    tracing::info!("Forwarding consumption from {} to {}", from, to);
    let mut session = Session::launch(credentials, &launch, options)
        .await
        .context("Failed to start portal session")?;

    let summary = forwarder::forward_consumption(&mut session, influx_client, from, to).await;

    if let Err(e) = session.close().await {
        tracing::warn!("Failed to close portal session: {:?}", e);
    }
    Ok(summary)
}

fn exit_status(summary: &ForwardSummary) -> u8 {
    if summary.is_success() {
        0
    } else {
        for failed in &summary.failed {
            tracing::error!(
                installation = failed.name.as_str(),
                meter_point = %failed.meter_point,
                "Installation failed: {}",
                failed.error
            );
        }
        1
    }
}
