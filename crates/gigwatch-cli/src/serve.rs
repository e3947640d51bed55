//! Scheduled checks alongside the REST API (`gigwatch serve`).

use std::{sync::Arc, time::Duration};

use anyhow::Context as _;
use axum::Router;
use chrono::Local;
use gigwatch_api::{ApiState, api_router};
use gigwatch_core::{artist::ArtistSelection, run::RunMode, window::WindowPolicy};
use gigwatch_monitor::{DispatchOutcome, Error};
use tokio::{net::TcpListener, time::MissedTickBehavior};
use tower_http::trace::TraceLayer;

use crate::{AppMonitor, config::Settings};

pub async fn run(settings: &Settings, monitor: Arc<AppMonitor>) -> anyhow::Result<()> {
  let policy = settings.window_policy();
  let state = ApiState { monitor: monitor.clone(), window_policy: policy };
  let app = Router::new()
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", settings.api.host, settings.api.port);
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!("Listening on http://{address}/api");

  let scheduler = tokio::spawn(schedule(monitor.clone(), policy, settings.check_interval()));

  let served = axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal(monitor))
    .await
    .context("server error");

  scheduler.abort();
  served
}

/// Run an all-artist normal check every `period`, the first one immediately.
///
/// A tick that finds the previous check still running is skipped rather than
/// queued.
async fn schedule(monitor: Arc<AppMonitor>, policy: WindowPolicy, period: Duration) {
  let mut ticker = tokio::time::interval(period);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

  loop {
    ticker.tick().await;
    let window = policy.window_for(Local::now().date_naive());

    match monitor.run_check(&ArtistSelection::All, window, RunMode::Normal).await {
      Ok(report) => {
        let failed = report.artists.iter().filter(|a| a.error.is_some()).count();
        match &report.dispatch {
          DispatchOutcome::Failed { error } => tracing::error!(
            run_id = %report.run_id,
            error = %error,
            "scheduled check could not notify"
          ),
          _ => tracing::info!(
            run_id = %report.run_id,
            notified = report.notified.len(),
            failed_artists = failed,
            "scheduled check finished"
          ),
        }
      }
      Err(Error::RunInProgress) => {
        tracing::info!("previous check still running; skipping this tick");
      }
      Err(e) => tracing::error!(error = %e, "scheduled check failed"),
    }
  }
}

/// Resolves on Ctrl-C, cancelling any in-flight check first.
async fn shutdown_signal(monitor: Arc<AppMonitor>) {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  if monitor.cancel_current() {
    tracing::info!("cancelled in-flight check");
  }
  tracing::info!("shutting down");
}
