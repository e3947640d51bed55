//! JSON REST API for gigwatch.
//!
//! Exposes an axum [`Router`] over a shared [`Monitor`]: ledger reads come
//! straight from its store, and checks are triggered (or cancelled) through
//! the monitor so they share its run lock with scheduled runs.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", gigwatch_api::api_router(state))
//! ```

pub mod check;
pub mod error;
pub mod events;
pub mod notifications;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use chrono::Local;
use gigwatch_core::{
  source::EventSource,
  store::EventStore,
  transport::Transport,
  window::{DateWindow, WindowPolicy},
};
use gigwatch_monitor::Monitor;

pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct ApiState<S, F, T> {
  pub monitor:       Arc<Monitor<S, F, T>>,
  /// Used when a request does not name its own window.
  pub window_policy: WindowPolicy,
}

impl<S, F, T> Clone for ApiState<S, F, T> {
  fn clone(&self) -> Self {
    Self {
      monitor:       self.monitor.clone(),
      window_policy: self.window_policy,
    }
  }
}

impl<S, F, T> ApiState<S, F, T> {
  pub(crate) fn default_window(&self) -> DateWindow {
    self.window_policy.window_for(Local::now().date_naive())
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, F, T>(state: ApiState<S, F, T>) -> Router<()>
where
  S: EventStore + 'static,
  F: EventSource + 'static,
  T: Transport + 'static,
{
  Router::new()
    // Events
    .route("/events", get(events::list::<S, F, T>))
    .route("/events/unnotified", get(events::unnotified::<S, F, T>))
    .route("/events/{id}", get(events::get_one::<S, F, T>))
    .route("/events/{id}/notify", post(events::notify_one::<S, F, T>))
    // Notifications
    .route("/notifications", get(notifications::recent::<S, F, T>))
    // Checks
    .route(
      "/check",
      post(check::run::<S, F, T>).delete(check::cancel::<S, F, T>),
    )
    .with_state(state)
}
