//! Error type for `gigwatch-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Attempted to record a notification for an event that was never stored.
  #[error("event not found: {0}")]
  EventNotFound(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
