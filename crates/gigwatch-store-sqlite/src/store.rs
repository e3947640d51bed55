//! [`SqliteStore`] — the SQLite implementation of [`EventStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, types::Value};

use gigwatch_core::{
  event::{Event, EventArtist, EventRecord, Notification, RawEvent},
  store::EventStore,
  window::DateWindow,
};

use crate::{
  encode::{
    encode_date, encode_dt, RawEventRow, RawNotification, RawRecord, EVENT_COLUMNS,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A gigwatch ledger backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Run an event query and attach each row's artists in source order.
fn load_records<P: rusqlite::Params>(
  conn: &rusqlite::Connection,
  sql: &str,
  params: P,
) -> rusqlite::Result<Vec<RawRecord>> {
  let mut stmt = conn.prepare(sql)?;
  let events = stmt
    .query_map(params, RawEventRow::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut artists_stmt = conn.prepare_cached(
    "SELECT event_id, artist_id, artist_name
     FROM event_artists
     WHERE event_id = ?1
     ORDER BY position",
  )?;

  events
    .into_iter()
    .map(|event| {
      let artists = artists_stmt
        .query_map([&event.id], |row| {
          Ok(EventArtist {
            event_id:    row.get(0)?,
            artist_id:   row.get(1)?,
            artist_name: row.get(2)?,
          })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      Ok(RawRecord { event, artists })
    })
    .collect()
}

fn into_records(raws: Vec<RawRecord>) -> Result<Vec<EventRecord>> {
  raws.into_iter().map(RawRecord::into_record).collect()
}

// ─── EventStore impl ─────────────────────────────────────────────────────────

impl EventStore for SqliteStore {
  type Error = Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn upsert_event(&self, record: &RawEvent) -> Result<Event> {
    let id            = record.id.clone();
    let title         = record.title.clone();
    let event_date    = encode_date(record.date);
    let starts_at_str = encode_dt(record.starts_at);
    let ends_at_str   = record.ends_at.map(encode_dt);
    let venue_name    = record.venue_name.clone();
    let venue_id      = record.venue_id.clone();
    let url           = record.url.clone();
    let attendance    = i64::from(record.attendance);
    let flags         = (record.ticketed, record.queue_enabled, record.new_listing);
    let now_str       = encode_dt(Utc::now());
    let artists: Vec<(String, String)> = record
      .artists
      .iter()
      .map(|a| (a.id.clone(), a.name.clone()))
      .collect();
    let artist_count = artists.len();

    let raw: RawEventRow = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        tx.execute(
          "INSERT INTO events (
             id, title, event_date, starts_at, ends_at,
             venue_name, venue_id, url, attendance,
             ticketed, queue_enabled, new_listing,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)
           ON CONFLICT(id) DO UPDATE SET
             title         = excluded.title,
             event_date    = excluded.event_date,
             starts_at     = excluded.starts_at,
             ends_at       = excluded.ends_at,
             venue_name    = excluded.venue_name,
             venue_id      = excluded.venue_id,
             url           = excluded.url,
             attendance    = excluded.attendance,
             ticketed      = excluded.ticketed,
             queue_enabled = excluded.queue_enabled,
             new_listing   = excluded.new_listing,
             updated_at    = excluded.updated_at",
          rusqlite::params![
            id,
            title,
            event_date,
            starts_at_str,
            ends_at_str,
            venue_name,
            venue_id,
            url,
            attendance,
            flags.0,
            flags.1,
            flags.2,
            now_str,
          ],
        )?;

        tx.execute("DELETE FROM event_artists WHERE event_id = ?1", [&id])?;
        {
          // A source listing the same artist twice keeps the first position.
          let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO event_artists (event_id, artist_id, artist_name, position)
             VALUES (?1, ?2, ?3, ?4)",
          )?;
          for (position, (artist_id, artist_name)) in artists.iter().enumerate() {
            stmt.execute(rusqlite::params![id, artist_id, artist_name, position as i64])?;
          }
        }

        let row = tx.query_row(
          &format!("SELECT {EVENT_COLUMNS} FROM events e WHERE e.id = ?1"),
          [&id],
          RawEventRow::from_row,
        )?;

        tx.commit()?;
        Ok(row)
      })
      .await?;

    tracing::debug!(event = %raw.id, artists = artist_count, "upserted event");
    raw.into_event()
  }

  async fn mark_notified(&self, event_id: &str, reason: &str) -> Result<Notification> {
    let event_id_str = event_id.to_owned();
    let message      = reason.to_owned();
    let sent_at      = Utc::now();
    let sent_at_str  = encode_dt(sent_at);

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let exists = conn
          .query_row(
            "SELECT 1 FROM events WHERE id = ?1",
            [&event_id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if !exists {
          return Ok(None);
        }

        conn.execute(
          "INSERT INTO notifications (event_id, sent_at, message) VALUES (?1, ?2, ?3)",
          rusqlite::params![event_id_str, sent_at_str, message],
        )?;
        Ok(Some(conn.last_insert_rowid()))
      })
      .await?;

    let id = id.ok_or_else(|| Error::EventNotFound(event_id.to_owned()))?;

    Ok(Notification {
      id,
      event_id: event_id.to_owned(),
      sent_at,
      message: reason.to_owned(),
    })
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn events_in_window(&self, window: DateWindow) -> Result<Vec<EventRecord>> {
    let start = encode_date(window.start);
    let end   = encode_date(window.end);

    let raws = self
      .conn
      .call(move |conn| {
        Ok(load_records(
          conn,
          &format!(
            "SELECT {EVENT_COLUMNS}
             FROM events e
             WHERE e.event_date BETWEEN ?1 AND ?2
             ORDER BY e.event_date, e.starts_at, e.id"
          ),
          rusqlite::params![start, end],
        )?)
      })
      .await?;

    into_records(raws)
  }

  async fn unnotified_for_artists(
    &self,
    artist_ids: &[String],
    window:     DateWindow,
  ) -> Result<Vec<EventRecord>> {
    if artist_ids.is_empty() {
      return Ok(Vec::new());
    }

    // ?1 and ?2 bound the window; the artist IDs follow from ?3.
    let placeholders = (0..artist_ids.len())
      .map(|i| format!("?{}", i + 3))
      .collect::<Vec<_>>()
      .join(", ");
    let sql = format!(
      "SELECT {EVENT_COLUMNS}
       FROM events e
       WHERE e.event_date BETWEEN ?1 AND ?2
         AND EXISTS (
           SELECT 1 FROM event_artists ea
           WHERE ea.event_id = e.id AND ea.artist_id IN ({placeholders})
         )
         AND NOT EXISTS (
           SELECT 1 FROM notifications n WHERE n.event_id = e.id
         )
       ORDER BY e.event_date, e.starts_at, e.id"
    );

    let mut params = Vec::with_capacity(artist_ids.len() + 2);
    params.push(Value::Integer(encode_date(window.start)));
    params.push(Value::Integer(encode_date(window.end)));
    params.extend(artist_ids.iter().cloned().map(Value::Text));

    let raws = self
      .conn
      .call(move |conn| {
        Ok(load_records(conn, &sql, rusqlite::params_from_iter(params))?)
      })
      .await?;

    into_records(raws)
  }

  async fn has_been_notified(&self, event_id: &str) -> Result<bool> {
    let event_id_str = event_id.to_owned();

    let notified = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT EXISTS (SELECT 1 FROM notifications WHERE event_id = ?1)",
          [&event_id_str],
          |row| row.get::<_, bool>(0),
        )?)
      })
      .await?;

    Ok(notified)
  }

  async fn get_event(&self, event_id: &str) -> Result<Option<EventRecord>> {
    let event_id_str = event_id.to_owned();

    let mut raws = self
      .conn
      .call(move |conn| {
        Ok(load_records(
          conn,
          &format!("SELECT {EVENT_COLUMNS} FROM events e WHERE e.id = ?1"),
          [&event_id_str],
        )?)
      })
      .await?;

    raws.pop().map(RawRecord::into_record).transpose()
  }

  async fn notifications_for_event(&self, event_id: &str) -> Result<Vec<Notification>> {
    let event_id_str = event_id.to_owned();

    let raws: Vec<RawNotification> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, event_id, sent_at, message
           FROM notifications
           WHERE event_id = ?1
           ORDER BY id",
        )?;
        let rows = stmt
          .query_map([&event_id_str], RawNotification::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawNotification::into_notification).collect()
  }

  async fn recent_notifications(&self, limit: usize) -> Result<Vec<Notification>> {
    let limit_val = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawNotification> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, event_id, sent_at, message
           FROM notifications
           ORDER BY id DESC
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map([limit_val], RawNotification::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawNotification::into_notification).collect()
  }
}
