//! The ingestion, deduplication and notification pipeline.
//!
//! [`Monitor::run_check`] walks the selected artists one at a time, pulls
//! every page the [`EventSource`](gigwatch_core::EventSource) offers, upserts
//! the results into the [`EventStore`](gigwatch_core::EventStore), and sends a
//! single digest through the [`Notifier`] for everything not yet announced.
//! Events are marked notified only after the transport confirms delivery.

pub mod error;
pub mod monitor;
pub mod notifier;
pub mod report;

pub use error::{Error, Result};
pub use monitor::{Monitor, MonitorConfig};
pub use notifier::Notifier;
pub use report::{ArtistOutcome, DispatchOutcome, NotifyOutcome, RunReport};
