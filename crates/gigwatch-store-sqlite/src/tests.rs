//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Days, NaiveDate, TimeZone, Utc};
use gigwatch_core::{
  event::{RawArtist, RawEvent},
  store::EventStore,
  window::{DateWindow, WindowPolicy},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn base_day() -> NaiveDate { NaiveDate::from_ymd_opt(2026, 11, 1).unwrap() }

fn day(offset: u64) -> NaiveDate {
  base_day().checked_add_days(Days::new(offset)).unwrap()
}

fn window(from: u64, to: u64) -> DateWindow {
  DateWindow::new(day(from), day(to)).unwrap()
}

fn artist(id: &str, name: &str) -> RawArtist {
  RawArtist { id: id.into(), name: name.into() }
}

fn raw_event(id: &str, offset: u64, artists: Vec<RawArtist>) -> RawEvent {
  let date = day(offset);
  RawEvent {
    id:            id.into(),
    title:         format!("Show {id}"),
    date,
    starts_at:     Utc.from_utc_datetime(&date.and_hms_opt(20, 0, 0).unwrap()),
    ends_at:       None,
    venue_name:    Some("The Hall".into()),
    venue_id:      Some("v1".into()),
    url:           Some(format!("https://events.example/{id}")),
    attendance:    10,
    ticketed:      true,
    queue_enabled: false,
    new_listing:   true,
    artists,
  }
}

fn ids(records: &[gigwatch_core::EventRecord]) -> Vec<&str> {
  records.iter().map(|r| r.event.id.as_str()).collect()
}

// ─── Upsert ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_then_read_in_window() {
  let s = store().await;
  let input = raw_event("e1", 2, vec![artist("a", "Alpha")]);

  let stored = s.upsert_event(&input).await.unwrap();
  assert_eq!(stored.id, "e1");
  assert_eq!(stored.created_at, stored.updated_at);

  let found = s.events_in_window(window(0, 30)).await.unwrap();
  assert_eq!(found.len(), 1);
  let rec = &found[0];
  assert_eq!(rec.event.title, input.title);
  assert_eq!(rec.event.date, input.date);
  assert_eq!(rec.event.starts_at, input.starts_at);
  assert_eq!(rec.event.venue_name, input.venue_name);
  assert_eq!(rec.event.url, input.url);
  assert_eq!(rec.event.attendance, 10);
  assert!(rec.event.ticketed && rec.event.new_listing && !rec.event.queue_enabled);
  assert_eq!(rec.artist_summary(), "Alpha");
}

#[tokio::test]
async fn upsert_replaces_fields_but_keeps_identity() {
  let s = store().await;
  let first = s
    .upsert_event(&raw_event("e1", 2, vec![artist("a", "Alpha")]))
    .await
    .unwrap();

  let mut changed = raw_event("e1", 3, vec![artist("a", "Alpha")]);
  changed.title = "Renamed".into();
  changed.venue_name = None;
  changed.attendance = 99;
  changed.ticketed = false;

  let second = s.upsert_event(&changed).await.unwrap();
  assert_eq!(second.id, "e1");
  assert_eq!(second.created_at, first.created_at);
  assert!(second.updated_at >= first.updated_at);
  assert_eq!(second.title, "Renamed");
  assert_eq!(second.date, day(3));
  assert_eq!(second.venue_name, None);
  assert_eq!(second.attendance, 99);
  assert!(!second.ticketed);

  let all = s.events_in_window(window(0, 30)).await.unwrap();
  assert_eq!(ids(&all), ["e1"]);
}

#[tokio::test]
async fn upsert_same_record_twice_is_idempotent() {
  let s = store().await;
  let input = raw_event("e1", 2, vec![artist("a", "Alpha"), artist("b", "Beta")]);

  s.upsert_event(&input).await.unwrap();
  let before = s.get_event("e1").await.unwrap().unwrap();
  s.upsert_event(&input).await.unwrap();
  let after = s.get_event("e1").await.unwrap().unwrap();

  let mut before_event = before.event.clone();
  before_event.updated_at = after.event.updated_at;
  assert_eq!(before_event, after.event);
  assert_eq!(before.artists, after.artists);
}

#[tokio::test]
async fn artist_set_is_replaced_not_accumulated() {
  let s = store().await;
  s.upsert_event(&raw_event("e1", 2, vec![artist("a", "Alpha"), artist("b", "Beta")]))
    .await
    .unwrap();
  s.upsert_event(&raw_event("e1", 2, vec![artist("c", "Gamma"), artist("a", "Alpha")]))
    .await
    .unwrap();

  let rec = s.get_event("e1").await.unwrap().unwrap();
  let artist_ids: Vec<_> = rec.artists.iter().map(|a| a.artist_id.as_str()).collect();
  assert_eq!(artist_ids, ["c", "a"]);
  assert_eq!(rec.artist_summary(), "Gamma, Alpha");
  assert!(!rec.has_artist("b"));
}

#[tokio::test]
async fn duplicate_artist_in_one_record_is_collapsed() {
  let s = store().await;
  s.upsert_event(&raw_event(
    "e1",
    2,
    vec![artist("a", "Alpha"), artist("a", "Alpha"), artist("b", "Beta")],
  ))
  .await
  .unwrap();

  let rec = s.get_event("e1").await.unwrap().unwrap();
  assert_eq!(rec.artist_summary(), "Alpha, Beta");
}

// ─── Window reads ────────────────────────────────────────────────────────────

#[tokio::test]
async fn window_bounds_are_inclusive_and_ordered() {
  let s = store().await;
  for (id, offset) in [("late", 10), ("edge_end", 7), ("early", 0), ("outside", 8)] {
    s.upsert_event(&raw_event(id, offset, vec![artist("a", "Alpha")]))
      .await
      .unwrap();
  }

  let found = s.events_in_window(window(0, 7)).await.unwrap();
  assert_eq!(ids(&found), ["early", "edge_end"]);
}

#[tokio::test]
async fn window_saturated_at_calendar_limits_still_matches() {
  let s = store().await;
  s.upsert_event(&raw_event("e1", 2, vec![artist("a", "Alpha")])).await.unwrap();

  let wide = WindowPolicy { include_past_day_offset: u32::MAX, date_range_days: u32::MAX }
    .window_for(base_day());
  assert_eq!(wide, DateWindow { start: NaiveDate::MIN, end: NaiveDate::MAX });

  let ahead = WindowPolicy { include_past_day_offset: 0, date_range_days: u32::MAX }
    .window_for(base_day());

  for window in [wide, ahead] {
    assert_eq!(ids(&s.events_in_window(window).await.unwrap()), ["e1"]);
    let pending = s
      .unnotified_for_artists(&["a".to_string()], window)
      .await
      .unwrap();
    assert_eq!(ids(&pending), ["e1"]);
  }
}

#[tokio::test]
async fn get_event_missing_returns_none() {
  let s = store().await;
  assert!(s.get_event("nope").await.unwrap().is_none());
}

// ─── Dedup query ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn unnotified_matches_artist_window_and_history() {
  let s = store().await;
  s.upsert_event(&raw_event("a_in", 2, vec![artist("a", "Alpha")])).await.unwrap();
  s.upsert_event(&raw_event("a_out", 40, vec![artist("a", "Alpha")])).await.unwrap();
  s.upsert_event(&raw_event("b_in", 3, vec![artist("b", "Beta")])).await.unwrap();
  s.upsert_event(&raw_event("a_done", 4, vec![artist("a", "Alpha")])).await.unwrap();
  s.mark_notified("a_done", "batch notification").await.unwrap();

  let only_a = s
    .unnotified_for_artists(&["a".to_string()], window(0, 30))
    .await
    .unwrap();
  assert_eq!(ids(&only_a), ["a_in"]);

  let both = s
    .unnotified_for_artists(&["a".to_string(), "b".to_string()], window(0, 30))
    .await
    .unwrap();
  assert_eq!(ids(&both), ["a_in", "b_in"]);
}

#[tokio::test]
async fn unnotified_is_distinct_for_shared_events() {
  let s = store().await;
  s.upsert_event(&raw_event("shared", 2, vec![artist("a", "Alpha"), artist("b", "Beta")]))
    .await
    .unwrap();

  let found = s
    .unnotified_for_artists(&["a".to_string(), "b".to_string()], window(0, 30))
    .await
    .unwrap();
  assert_eq!(ids(&found), ["shared"]);
  assert_eq!(found[0].artists.len(), 2);
}

#[tokio::test]
async fn unnotified_with_no_artists_is_empty() {
  let s = store().await;
  s.upsert_event(&raw_event("e1", 2, vec![artist("a", "Alpha")])).await.unwrap();

  let found = s.unnotified_for_artists(&[], window(0, 30)).await.unwrap();
  assert!(found.is_empty());
}

#[tokio::test]
async fn reupsert_keeps_notification_history() {
  let s = store().await;
  s.upsert_event(&raw_event("e1", 2, vec![artist("a", "Alpha")])).await.unwrap();
  s.mark_notified("e1", "batch notification").await.unwrap();

  let mut changed = raw_event("e1", 2, vec![artist("a", "Alpha")]);
  changed.title = "New title".into();
  s.upsert_event(&changed).await.unwrap();

  let rec = s.get_event("e1").await.unwrap().unwrap();
  assert_eq!(rec.event.title, "New title");
  assert_eq!(s.notifications_for_event("e1").await.unwrap().len(), 1);
  assert!(
    s.unnotified_for_artists(&["a".to_string()], window(0, 30))
      .await
      .unwrap()
      .is_empty()
  );
}

// ─── Notifications ───────────────────────────────────────────────────────────

#[tokio::test]
async fn mark_notified_appends() {
  let s = store().await;
  s.upsert_event(&raw_event("e1", 2, vec![artist("a", "Alpha")])).await.unwrap();
  assert!(!s.has_been_notified("e1").await.unwrap());

  let first = s.mark_notified("e1", "batch notification").await.unwrap();
  let second = s.mark_notified("e1", "manual notification").await.unwrap();
  assert!(second.id > first.id);
  assert!(s.has_been_notified("e1").await.unwrap());

  let history = s.notifications_for_event("e1").await.unwrap();
  let messages: Vec<_> = history.iter().map(|n| n.message.as_str()).collect();
  assert_eq!(messages, ["batch notification", "manual notification"]);
}

#[tokio::test]
async fn mark_notified_unknown_event_fails() {
  let s = store().await;
  let err = s.mark_notified("ghost", "batch notification").await.unwrap_err();
  assert!(matches!(err, Error::EventNotFound(id) if id == "ghost"));
  assert!(!s.has_been_notified("ghost").await.unwrap());
}

#[tokio::test]
async fn recent_notifications_newest_first() {
  let s = store().await;
  for id in ["e1", "e2", "e3"] {
    s.upsert_event(&raw_event(id, 2, vec![artist("a", "Alpha")])).await.unwrap();
    s.mark_notified(id, "batch notification").await.unwrap();
  }

  let recent = s.recent_notifications(2).await.unwrap();
  let event_ids: Vec<_> = recent.iter().map(|n| n.event_id.as_str()).collect();
  assert_eq!(event_ids, ["e3", "e2"]);
}

#[tokio::test]
async fn reopening_file_store_keeps_data() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("ledger.db");

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.upsert_event(&raw_event("e1", 2, vec![artist("a", "Alpha")])).await.unwrap();
    s.mark_notified("e1", "batch notification").await.unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  assert!(s.get_event("e1").await.unwrap().is_some());
  assert!(s.has_been_notified("e1").await.unwrap());
}
