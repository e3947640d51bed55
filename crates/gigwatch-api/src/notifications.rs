//! Handler for `GET /notifications`.

use axum::{
  Json,
  extract::{Query, State},
};
use gigwatch_core::{
  event::Notification,
  source::EventSource,
  store::EventStore,
  transport::Transport,
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

const DEFAULT_LIMIT: usize = 50;

#[derive(Debug, Deserialize, Default)]
pub struct RecentParams {
  pub limit: Option<usize>,
}

/// `GET /notifications[?limit=...]`, newest first.
pub async fn recent<S, F, T>(
  State(state): State<ApiState<S, F, T>>,
  Query(params): Query<RecentParams>,
) -> Result<Json<Vec<Notification>>, ApiError>
where
  S: EventStore,
  F: EventSource,
  T: Transport,
{
  let notifications = state
    .monitor
    .store()
    .recent_notifications(params.limit.unwrap_or(DEFAULT_LIMIT))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(notifications))
}
