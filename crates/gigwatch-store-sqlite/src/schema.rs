//! SQL schema for the gigwatch SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per source event, keyed by the source's ID.
-- Upserts overwrite every column except id and created_at.
CREATE TABLE IF NOT EXISTS events (
    id            TEXT PRIMARY KEY,
    title         TEXT NOT NULL,
    event_date    INTEGER NOT NULL, -- canonical day, days since 0001-01-01 (day 1)
    starts_at     TEXT NOT NULL,   -- RFC 3339 UTC
    ends_at       TEXT,
    venue_name    TEXT,
    venue_id      TEXT,
    url           TEXT,
    attendance    INTEGER NOT NULL DEFAULT 0 CHECK (attendance >= 0),
    ticketed      INTEGER NOT NULL DEFAULT 0,
    queue_enabled INTEGER NOT NULL DEFAULT 0,
    new_listing   INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

-- Replaced wholesale on every upsert of the parent event.
CREATE TABLE IF NOT EXISTS event_artists (
    event_id    TEXT NOT NULL REFERENCES events(id) ON DELETE CASCADE,
    artist_id   TEXT NOT NULL,
    artist_name TEXT NOT NULL,
    position    INTEGER NOT NULL,  -- order as listed by the source
    PRIMARY KEY (event_id, artist_id)
);

-- Append-only. No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS notifications (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    event_id TEXT NOT NULL REFERENCES events(id),
    sent_at  TEXT NOT NULL,
    message  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS events_date_idx           ON events(event_date);
CREATE INDEX IF NOT EXISTS event_artists_artist_idx  ON event_artists(artist_id);
CREATE INDEX IF NOT EXISTS notifications_event_idx   ON notifications(event_id);

PRAGMA user_version = 1;
";
