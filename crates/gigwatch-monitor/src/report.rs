//! What a run did, for callers that want to render it.

use gigwatch_core::{artist::Artist, run::RunMode, window::DateWindow};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Summary of one [`Monitor::run_check`](crate::Monitor::run_check).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
  pub run_id:   Uuid,
  pub mode:     RunMode,
  pub window:   DateWindow,
  /// One entry per selected artist, in processing order.
  pub artists:  Vec<ArtistOutcome>,
  /// Event IDs marked notified by this run.
  pub notified: Vec<String>,
  pub dispatch: DispatchOutcome,
}

/// How one artist's ingest pass went.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtistOutcome {
  pub artist_id:   String,
  pub artist_name: String,
  /// Non-empty pages fetched.
  pub pages:       u32,
  pub upserted:    usize,
  /// Batch events attributed to this artist. Normal runs credit a shared
  /// event to the first artist that yields it; force runs credit every
  /// artist whose name it mentions.
  pub new_events:  usize,
  /// Set when the artist was skipped after a fetch or store failure.
  pub error:       Option<String>,
}

impl ArtistOutcome {
  pub(crate) fn start(artist: &Artist) -> Self {
    Self {
      artist_id: artist.id.clone(),
      artist_name: artist.name.clone(),
      ..Self::default()
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchOutcome {
  NothingNew,
  Sent { count: usize },
  /// The batch stays unmarked and is offered again next run.
  Failed { error: String },
}

/// Result of [`Monitor::notify_event`](crate::Monitor::notify_event).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NotifyOutcome {
  AlreadyNotified,
  Sent,
  Failed { error: String },
}
