//! Handlers for `/check`, the on-demand runs.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/check` | Body: `{"mode":"normal"\|"force","artists":[...]}`; 409 while a run is in flight |
//! | `DELETE` | `/check` | Cancels the in-flight run; 404 if none |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
};
use chrono::NaiveDate;
use gigwatch_core::{
  artist::ArtistSelection,
  run::RunMode,
  source::EventSource,
  store::EventStore,
  transport::Transport,
};
use gigwatch_monitor::RunReport;
use serde::Deserialize;

use crate::{ApiState, error::ApiError, events::window_or_default};

#[derive(Debug, Deserialize, Default)]
pub struct CheckBody {
  #[serde(default)]
  pub mode:    RunMode,
  /// Subset of configured artist IDs; all when absent.
  pub artists: Option<Vec<String>>,
  pub start:   Option<NaiveDate>,
  pub end:     Option<NaiveDate>,
}

/// `POST /check`
pub async fn run<S, F, T>(
  State(state): State<ApiState<S, F, T>>,
  Json(body): Json<CheckBody>,
) -> Result<Json<RunReport>, ApiError>
where
  S: EventStore,
  F: EventSource,
  T: Transport,
{
  let selection = match body.artists {
    Some(ids) => ArtistSelection::Only(ids),
    None => ArtistSelection::All,
  };
  let window = window_or_default(body.start, body.end, state.default_window())?;

  tracing::info!(mode = ?body.mode, "check requested over API");
  let report = state.monitor.run_check(&selection, window, body.mode).await?;
  Ok(Json(report))
}

/// `DELETE /check`
pub async fn cancel<S, F, T>(
  State(state): State<ApiState<S, F, T>>,
) -> Result<StatusCode, ApiError>
where
  S: EventStore,
  F: EventSource,
  T: Transport,
{
  if state.monitor.cancel_current() {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound("no check is running".into()))
  }
}
