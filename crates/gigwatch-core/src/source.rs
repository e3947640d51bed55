//! Paginated event listings.

use std::future::Future;

use crate::{event::RawEvent, window::DateWindow};

/// A paginated listing of events per artist.
///
/// Pages are numbered from 1. An empty page means there are no more events;
/// any failure must surface as `Err`, never as an empty page, so a run can
/// tell "done" apart from "broken".
pub trait EventSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn fetch_page<'a>(
    &'a self,
    artist_id: &'a str,
    window: DateWindow,
    page: u32,
  ) -> impl Future<Output = Result<Vec<RawEvent>, Self::Error>> + Send + 'a;
}
