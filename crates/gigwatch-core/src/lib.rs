//! Core types and trait definitions for gigwatch.
//!
//! This crate has no HTTP or database dependencies. It
//! describes the ledger (events, artist associations, notifications) and the
//! three collaborators a run talks to: the [`EventStore`], the
//! [`EventSource`] and the [`Transport`].

pub mod artist;
pub mod error;
pub mod event;
pub mod run;
pub mod source;
pub mod store;
pub mod transport;
pub mod window;

pub use artist::{Artist, ArtistSelection};
pub use error::{Error, Result};
pub use event::{Event, EventArtist, EventRecord, Notification, RawArtist, RawEvent};
pub use run::RunMode;
pub use source::EventSource;
pub use store::EventStore;
pub use transport::{Digest, Priority, Transport};
pub use window::{DateWindow, WindowPolicy};
