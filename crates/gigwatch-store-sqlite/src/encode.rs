//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Canonical event dates are
//! stored as day numbers (day 1 = 0001-01-01) so that SQL comparisons stay
//! chronological over the whole range chrono can represent.

use chrono::{DateTime, Datelike as _, NaiveDate, Utc};
use gigwatch_core::event::{Event, EventArtist, EventRecord, Notification};

use crate::{Error, Result};

/// Columns selected for every event read, in [`RawEventRow::from_row`] order.
pub const EVENT_COLUMNS: &str = "e.id, e.title, e.event_date, e.starts_at, e.ends_at,
   e.venue_name, e.venue_id, e.url, e.attendance,
   e.ticketed, e.queue_enabled, e.new_listing,
   e.created_at, e.updated_at";

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> i64 { i64::from(d.num_days_from_ce()) }

pub fn decode_date(days: i64) -> Result<NaiveDate> {
  i32::try_from(days)
    .ok()
    .and_then(NaiveDate::from_num_days_from_ce_opt)
    .ok_or_else(|| Error::DateParse(format!("day number {days} is out of range")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from an `events` row.
pub struct RawEventRow {
  pub id:            String,
  pub title:         String,
  pub event_date:    i64,
  pub starts_at:     String,
  pub ends_at:       Option<String>,
  pub venue_name:    Option<String>,
  pub venue_id:      Option<String>,
  pub url:           Option<String>,
  pub attendance:    i64,
  pub ticketed:      bool,
  pub queue_enabled: bool,
  pub new_listing:   bool,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawEventRow {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      title:         row.get(1)?,
      event_date:    row.get(2)?,
      starts_at:     row.get(3)?,
      ends_at:       row.get(4)?,
      venue_name:    row.get(5)?,
      venue_id:      row.get(6)?,
      url:           row.get(7)?,
      attendance:    row.get(8)?,
      ticketed:      row.get(9)?,
      queue_enabled: row.get(10)?,
      new_listing:   row.get(11)?,
      created_at:    row.get(12)?,
      updated_at:    row.get(13)?,
    })
  }

  pub fn into_event(self) -> Result<Event> {
    Ok(Event {
      date:          decode_date(self.event_date)?,
      starts_at:     decode_dt(&self.starts_at)?,
      ends_at:       self.ends_at.as_deref().map(decode_dt).transpose()?,
      // The CHECK constraint keeps this non-negative.
      attendance:    u32::try_from(self.attendance).unwrap_or(u32::MAX),
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
      id:            self.id,
      title:         self.title,
      venue_name:    self.venue_name,
      venue_id:      self.venue_id,
      url:           self.url,
      ticketed:      self.ticketed,
      queue_enabled: self.queue_enabled,
      new_listing:   self.new_listing,
    })
  }
}

/// An event row together with its artist rows, still undecoded.
pub struct RawRecord {
  pub event:   RawEventRow,
  pub artists: Vec<EventArtist>,
}

impl RawRecord {
  pub fn into_record(self) -> Result<EventRecord> {
    Ok(EventRecord { event: self.event.into_event()?, artists: self.artists })
  }
}

/// Raw values read directly from a `notifications` row.
pub struct RawNotification {
  pub id:       i64,
  pub event_id: String,
  pub sent_at:  String,
  pub message:  String,
}

impl RawNotification {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:       row.get(0)?,
      event_id: row.get(1)?,
      sent_at:  row.get(2)?,
      message:  row.get(3)?,
    })
  }

  pub fn into_notification(self) -> Result<Notification> {
    Ok(Notification {
      id:       self.id,
      event_id: self.event_id,
      sent_at:  decode_dt(&self.sent_at)?,
      message:  self.message,
    })
  }
}
