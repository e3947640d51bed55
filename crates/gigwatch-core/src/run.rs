//! Run modes.

use serde::{Deserialize, Serialize};

/// How a run decides which events are notifiable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
  /// Only events with no notification history.
  #[default]
  Normal,
  /// Every event currently in the window, regardless of history.
  Force,
}

impl RunMode {
  /// Message recorded on every notification row written by a run in this
  /// mode.
  pub fn reason(self) -> &'static str {
    match self {
      Self::Normal => "batch notification",
      Self::Force => "manual notification",
    }
  }
}
