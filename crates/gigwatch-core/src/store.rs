//! The `EventStore` trait — the durable ledger behind every run.
//!
//! The trait is implemented by storage backends (e.g.
//! `gigwatch-store-sqlite`). The monitor and the API depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  event::{Event, EventRecord, Notification, RawEvent},
  window::DateWindow,
};

/// Abstraction over a gigwatch ledger backend.
///
/// Events are upserted by source ID. Notifications are append-only: no method
/// updates or deletes a notification row, and the existence of one marks its
/// event as already announced.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait EventStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Insert `record`, or fully replace the stored event with the same ID.
  ///
  /// Mutable fields are overwritten and `updated_at` is set to now; `id` and
  /// `created_at` are preserved. The event's artist associations are replaced
  /// with `record.artists` in the same transaction, so readers never observe
  /// a half-replaced list.
  fn upsert_event<'a>(
    &'a self,
    record: &'a RawEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + 'a;

  /// Append a notification row for `event_id`.
  fn mark_notified<'a>(
    &'a self,
    event_id: &'a str,
    reason: &'a str,
  ) -> impl Future<Output = Result<Notification, Self::Error>> + Send + 'a;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Events whose canonical date falls inside `window`, oldest first.
  fn events_in_window(
    &self,
    window: DateWindow,
  ) -> impl Future<Output = Result<Vec<EventRecord>, Self::Error>> + Send + '_;

  /// Distinct events inside `window` associated with any of `artist_ids`
  /// that have no notification row, oldest first.
  fn unnotified_for_artists<'a>(
    &'a self,
    artist_ids: &'a [String],
    window: DateWindow,
  ) -> impl Future<Output = Result<Vec<EventRecord>, Self::Error>> + Send + 'a;

  /// Whether at least one notification row references `event_id`.
  fn has_been_notified<'a>(
    &'a self,
    event_id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// A single event with its artists. Returns `None` if not found.
  fn get_event<'a>(
    &'a self,
    event_id: &'a str,
  ) -> impl Future<Output = Result<Option<EventRecord>, Self::Error>> + Send + 'a;

  /// The notification history of one event, oldest first.
  fn notifications_for_event<'a>(
    &'a self,
    event_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Notification>, Self::Error>> + Send + 'a;

  /// The most recent `limit` notifications across all events, newest first.
  fn recent_notifications(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Notification>, Self::Error>> + Send + '_;
}
