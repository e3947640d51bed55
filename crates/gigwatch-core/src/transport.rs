//! Outbound push messages and the `Transport` trait that delivers them.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Push priority on a 1 (min) to 5 (urgent) scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Priority(u8);

impl Priority {
  pub const NORMAL: Self = Self(3);
  /// Used for batch digests.
  pub const HIGH: Self = Self(4);

  pub fn new(value: u8) -> Result<Self> {
    if (1..=5).contains(&value) {
      Ok(Self(value))
    } else {
      Err(Error::InvalidPriority(value))
    }
  }

  pub fn get(self) -> u8 { self.0 }
}

impl TryFrom<u8> for Priority {
  type Error = Error;

  fn try_from(value: u8) -> Result<Self> { Self::new(value) }
}

impl From<Priority> for u8 {
  fn from(p: Priority) -> u8 { p.0 }
}

/// A fully composed push message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest {
  pub title:    String,
  pub body:     String,
  pub priority: Priority,
  /// Link opened when the message is tapped.
  pub click:    Option<String>,
}

/// Delivers a [`Digest`]. Implementations must not retry on their own; the
/// caller's "mark only after a confirmed send" rule is the retry mechanism.
pub trait Transport: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn send<'a>(
    &'a self,
    digest: &'a Digest,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
