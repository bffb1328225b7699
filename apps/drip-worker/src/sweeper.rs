use std::time::Duration;

use color_eyre::Result;
use tokio::time;

use drip_service::{Error, LeadService, sweep};

/// Runs pipeline sweeps on the configured interval until the process is stopped.
/// A sweep that fails is logged and retried on the next tick; an unconfigured
/// sheet is fatal, since no sweep can ever succeed without one.
pub async fn run_sweeper(service: LeadService) -> Result<()> {
	let interval = Duration::from_secs(service.cfg.pipeline.sweep_interval_secs);

	tracing::info!(interval_secs = interval.as_secs(), "Sweeper started.");

	loop {
		match sweep::run_sweep(&service).await {
			Ok(report) => {
				tracing::info!(log_lines = report.logs.len(), "Sweep finished.");
			},
			Err(Error::SheetNotConfigured) => {
				return Err(Error::SheetNotConfigured.into());
			},
			Err(err) => {
				tracing::error!(error = %err, "Sweep failed.");
			},
		}

		time::sleep(interval).await;
	}
}
