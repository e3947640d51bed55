//! Handlers for `/events` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/events` | Optional `?start=YYYY-MM-DD&end=YYYY-MM-DD` |
//! | `GET`  | `/events/unnotified` | Optional `?artist=<id>[,<id>]`, `start`, `end` |
//! | `GET`  | `/events/:id` | Event plus notification history; 404 if not found |
//! | `POST` | `/events/:id/notify` | Optional `?force=true` |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chrono::NaiveDate;
use gigwatch_core::{
  event::{EventRecord, Notification},
  source::EventSource,
  store::EventStore,
  transport::Transport,
  window::DateWindow,
};
use gigwatch_monitor::NotifyOutcome;
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

// ─── Window params ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct WindowParams {
  pub start: Option<NaiveDate>,
  pub end:   Option<NaiveDate>,
}

impl WindowParams {
  /// Fill missing bounds from `default`, then validate.
  pub(crate) fn resolve(&self, default: DateWindow) -> Result<DateWindow, ApiError> {
    window_or_default(self.start, self.end, default)
  }
}

pub(crate) fn window_or_default(
  start:   Option<NaiveDate>,
  end:     Option<NaiveDate>,
  default: DateWindow,
) -> Result<DateWindow, ApiError> {
  Ok(DateWindow::new(
    start.unwrap_or(default.start),
    end.unwrap_or(default.end),
  )?)
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /events[?start=...][&end=...]`
pub async fn list<S, F, T>(
  State(state): State<ApiState<S, F, T>>,
  Query(params): Query<WindowParams>,
) -> Result<Json<Vec<EventRecord>>, ApiError>
where
  S: EventStore,
  F: EventSource,
  T: Transport,
{
  let window = params.resolve(state.default_window())?;
  let events = state
    .monitor
    .store()
    .events_in_window(window)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(events))
}

// ─── Unnotified ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UnnotifiedParams {
  /// Comma-separated artist IDs; defaults to every configured artist.
  pub artist: Option<String>,
  pub start:  Option<NaiveDate>,
  pub end:    Option<NaiveDate>,
}

/// `GET /events/unnotified[?artist=a,b][&start=...][&end=...]`
pub async fn unnotified<S, F, T>(
  State(state): State<ApiState<S, F, T>>,
  Query(params): Query<UnnotifiedParams>,
) -> Result<Json<Vec<EventRecord>>, ApiError>
where
  S: EventStore,
  F: EventSource,
  T: Transport,
{
  let window = window_or_default(params.start, params.end, state.default_window())?;
  let artist_ids: Vec<String> = match &params.artist {
    Some(list) => list
      .split(',')
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(str::to_owned)
      .collect(),
    None => state
      .monitor
      .config()
      .artists
      .iter()
      .map(|a| a.id.clone())
      .collect(),
  };

  let events = state
    .monitor
    .store()
    .unnotified_for_artists(&artist_ids, window)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(events))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct EventDetail {
  #[serde(flatten)]
  pub record:        EventRecord,
  pub notifications: Vec<Notification>,
}

/// `GET /events/:id`
pub async fn get_one<S, F, T>(
  State(state): State<ApiState<S, F, T>>,
  Path(id): Path<String>,
) -> Result<Json<EventDetail>, ApiError>
where
  S: EventStore,
  F: EventSource,
  T: Transport,
{
  let store = state.monitor.store();
  let record = store
    .get_event(&id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("event {id} not found")))?;
  let notifications = store
    .notifications_for_event(&id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(EventDetail { record, notifications }))
}

// ─── Notify one ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct NotifyParams {
  #[serde(default)]
  pub force: bool,
}

/// `POST /events/:id/notify[?force=true]`
pub async fn notify_one<S, F, T>(
  State(state): State<ApiState<S, F, T>>,
  Path(id): Path<String>,
  Query(params): Query<NotifyParams>,
) -> Result<Json<NotifyOutcome>, ApiError>
where
  S: EventStore,
  F: EventSource,
  T: Transport,
{
  let outcome = state.monitor.notify_event(&id, params.force).await?;
  Ok(Json(outcome))
}
