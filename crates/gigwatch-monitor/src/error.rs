//! Error types for `gigwatch-monitor`.
//!
//! Source and transport failures never appear here: they are contained in
//! the run that produced them and reported through
//! [`RunReport`](crate::RunReport).

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  /// Rejected before any network activity.
  #[error("configuration error: {0}")]
  Config(#[from] gigwatch_core::Error),

  #[error("a check is already running")]
  RunInProgress,

  #[error("run cancelled")]
  Cancelled,

  #[error("event not found: {0}")]
  EventNotFound(String),

  /// Store failure outside an artist's ingest pass (delta or bookkeeping).
  #[error("store error: {0}")]
  Store(#[source] BoxError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Why one artist contributed nothing to a run.
#[derive(Debug, Error)]
pub(crate) enum IngestError {
  #[error("fetching page {page} failed: {source}")]
  Fetch {
    page:   u32,
    #[source]
    source: BoxError,
  },

  #[error("storing event {event_id} failed: {source}")]
  Store {
    event_id: String,
    #[source]
    source:   BoxError,
  },
}

pub(crate) fn store_error<E>(e: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  Error::Store(Box::new(e))
}
