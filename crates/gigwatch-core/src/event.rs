//! Event types — what the source reports and what the ledger keeps.
//!
//! A [`RawEvent`] is one record as fetched from the source. Upserting it
//! produces an [`Event`] row plus one [`EventArtist`] row per listed artist.
//! [`Notification`] rows form the append-only audit trail that marks an event
//! as already announced.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ─── Source records ──────────────────────────────────────────────────────────

/// An artist as listed on a fetched event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawArtist {
  pub id:   String,
  pub name: String,
}

/// One event record as returned by the source.
///
/// Deserialisation goes through [`WireEvent`] so the attendance count can be
/// read from whichever field name the source used, and so the canonical date
/// can fall back to the start timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "WireEvent")]
pub struct RawEvent {
  pub id:            String,
  pub title:         String,
  pub date:          NaiveDate,
  pub starts_at:     DateTime<Utc>,
  pub ends_at:       Option<DateTime<Utc>>,
  pub venue_name:    Option<String>,
  pub venue_id:      Option<String>,
  pub url:           Option<String>,
  pub attendance:    u32,
  pub ticketed:      bool,
  pub queue_enabled: bool,
  pub new_listing:   bool,
  pub artists:       Vec<RawArtist>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEvent {
  id:               String,
  title:            String,
  date:             Option<NaiveDate>,
  starts_at:        DateTime<Utc>,
  ends_at:          Option<DateTime<Utc>>,
  venue_name:       Option<String>,
  venue_id:         Option<String>,
  url:              Option<String>,
  attendance:       Option<u32>,
  #[serde(alias = "attending_count")]
  attending_count:  Option<u32>,
  #[serde(alias = "rsvp_count")]
  rsvp_count:       Option<u32>,
  #[serde(alias = "interested_count")]
  interested_count: Option<u32>,
  #[serde(default)]
  ticketed:         bool,
  #[serde(default)]
  queue_enabled:    bool,
  #[serde(default)]
  new_listing:      bool,
  #[serde(default)]
  artists:          Vec<RawArtist>,
}

impl From<WireEvent> for RawEvent {
  fn from(w: WireEvent) -> Self {
    let attendance = w
      .attendance
      .or(w.attending_count)
      .or(w.rsvp_count)
      .or(w.interested_count)
      .unwrap_or(0);

    Self {
      date: w.date.unwrap_or_else(|| w.starts_at.date_naive()),
      id: w.id,
      title: w.title,
      starts_at: w.starts_at,
      ends_at: w.ends_at,
      venue_name: w.venue_name,
      venue_id: w.venue_id,
      url: w.url,
      attendance,
      ticketed: w.ticketed,
      queue_enabled: w.queue_enabled,
      new_listing: w.new_listing,
      artists: w.artists,
    }
  }
}

// ─── Ledger rows ─────────────────────────────────────────────────────────────

/// A persisted event. `id` is the source's ID and never changes;
/// `created_at` and `updated_at` are managed by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
  pub id:            String,
  pub title:         String,
  pub date:          NaiveDate,
  pub starts_at:     DateTime<Utc>,
  pub ends_at:       Option<DateTime<Utc>>,
  pub venue_name:    Option<String>,
  pub venue_id:      Option<String>,
  pub url:           Option<String>,
  pub attendance:    u32,
  pub ticketed:      bool,
  pub queue_enabled: bool,
  pub new_listing:   bool,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

/// Association between an event and one of its artists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventArtist {
  pub event_id:    String,
  pub artist_id:   String,
  pub artist_name: String,
}

/// An event together with its current artist list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
  pub event:   Event,
  /// In the order the source listed them.
  pub artists: Vec<EventArtist>,
}

impl EventRecord {
  /// Artist display names joined with `", "`.
  pub fn artist_summary(&self) -> String {
    self
      .artists
      .iter()
      .map(|a| a.artist_name.as_str())
      .collect::<Vec<_>>()
      .join(", ")
  }

  pub fn has_artist(&self, artist_id: &str) -> bool {
    self.artists.iter().any(|a| a.artist_id == artist_id)
  }
}

/// One entry in the notification audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
  pub id:       i64,
  pub event_id: String,
  pub sent_at:  DateTime<Utc>,
  pub message:  String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn attendance_is_read_from_any_known_field() {
    for field in [
      "attendance",
      "attendingCount",
      "attending_count",
      "rsvpCount",
      "rsvp_count",
      "interestedCount",
    ] {
      let json = format!(
        r#"{{"id":"e1","title":"Show","startsAt":"2026-11-02T20:00:00Z","{field}":42}}"#
      );
      let ev: RawEvent = serde_json::from_str(&json).unwrap();
      assert_eq!(ev.attendance, 42, "field {field}");
    }
  }

  #[test]
  fn missing_attendance_and_flags_default() {
    let ev: RawEvent = serde_json::from_str(
      r#"{"id":"e1","title":"Show","startsAt":"2026-11-02T20:00:00Z"}"#,
    )
    .unwrap();
    assert_eq!(ev.attendance, 0);
    assert!(!ev.ticketed && !ev.queue_enabled && !ev.new_listing);
    assert!(ev.artists.is_empty());
  }

  #[test]
  fn date_falls_back_to_start_day() {
    let ev: RawEvent = serde_json::from_str(
      r#"{"id":"e1","title":"Show","startsAt":"2026-11-02T23:30:00Z"}"#,
    )
    .unwrap();
    assert_eq!(ev.date, NaiveDate::from_ymd_opt(2026, 11, 2).unwrap());

    let ev: RawEvent = serde_json::from_str(
      r#"{"id":"e1","title":"Show","date":"2026-11-03","startsAt":"2026-11-02T23:30:00Z"}"#,
    )
    .unwrap();
    assert_eq!(ev.date, NaiveDate::from_ymd_opt(2026, 11, 3).unwrap());
  }

  #[test]
  fn summary_joins_names_in_order() {
    let now = Utc::now();
    let record = EventRecord {
      event:   Event {
        id:            "e1".into(),
        title:         "Show".into(),
        date:          now.date_naive(),
        starts_at:     now,
        ends_at:       None,
        venue_name:    None,
        venue_id:      None,
        url:           None,
        attendance:    0,
        ticketed:      false,
        queue_enabled: false,
        new_listing:   false,
        created_at:    now,
        updated_at:    now,
      },
      artists: vec![
        EventArtist {
          event_id:    "e1".into(),
          artist_id:   "b".into(),
          artist_name: "Beta".into(),
        },
        EventArtist {
          event_id:    "e1".into(),
          artist_id:   "a".into(),
          artist_name: "Alpha".into(),
        },
      ],
    };
    assert_eq!(record.artist_summary(), "Beta, Alpha");
    assert!(record.has_artist("a"));
    assert!(!record.has_artist("c"));
  }
}
