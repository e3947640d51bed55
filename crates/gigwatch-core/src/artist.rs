//! Monitored artists and how a run selects among them.
//!
//! Configuration is the source of truth for artists; nothing in the ledger
//! ever creates one.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// An artist to poll, as supplied by configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
  /// External ID understood by the event source.
  pub id:   String,
  /// Display name used in digests and force-mode filtering.
  pub name: String,
}

impl Artist {
  pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
    Self { id: id.into(), name: name.into() }
  }
}

/// Which configured artists a run covers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "ids", rename_all = "snake_case")]
pub enum ArtistSelection {
  #[default]
  All,
  /// An explicit subset, by external artist ID.
  Only(Vec<String>),
}

impl ArtistSelection {
  /// Resolve the selection against `configured`, producing an owned snapshot.
  ///
  /// The snapshot is what a run iterates over, so later configuration
  /// changes never reach an in-flight run. Order follows `configured`.
  pub fn resolve(&self, configured: &[Artist]) -> Result<Vec<Artist>> {
    let resolved: Vec<Artist> = match self {
      Self::All => configured.to_vec(),
      Self::Only(ids) => {
        if let Some(missing) =
          ids.iter().find(|id| !configured.iter().any(|a| &a.id == *id))
        {
          return Err(Error::UnknownArtist(missing.clone()));
        }
        configured
          .iter()
          .filter(|a| ids.contains(&a.id))
          .cloned()
          .collect()
      }
    };

    if resolved.is_empty() {
      return Err(Error::NoArtists);
    }
    Ok(resolved)
  }
}
