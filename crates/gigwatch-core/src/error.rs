//! Error types for `gigwatch-core`.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid date window: {start} is after {end}")]
  InvalidWindow { start: NaiveDate, end: NaiveDate },

  #[error("no artists configured")]
  NoArtists,

  #[error("artist {0:?} is not configured")]
  UnknownArtist(String),

  #[error("priority must be between 1 and 5, got {0}")]
  InvalidPriority(u8),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
