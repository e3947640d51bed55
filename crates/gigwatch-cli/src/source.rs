//! [`HttpSource`] — the JSON event listing behind `gigwatch`.
//!
//! `GET {base_url}/artists/{id}/events?start_date=&end_date=&page=&per_page=`
//! answers `{ "events": [...] }`. An empty `events` array ends pagination;
//! every non-2xx answer is an error.

use std::time::Duration;

use anyhow::{Context as _, bail};
use gigwatch_core::{event::RawEvent, source::EventSource, window::DateWindow};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;

use crate::config::SourceSettings;

#[derive(Debug, Error)]
pub enum SourceError {
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("source answered {status} for artist {artist_id} page {page}")]
  Status {
    status:    StatusCode,
    artist_id: String,
    page:      u32,
  },
}

#[derive(Deserialize)]
struct EventPage {
  #[serde(default)]
  events: Vec<RawEvent>,
}

/// Async HTTP client for the event listing.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpSource {
  client:   Client,
  base_url: Url,
  api_key:  Option<String>,
  per_page: u32,
}

impl HttpSource {
  pub fn new(settings: &SourceSettings) -> anyhow::Result<Self> {
    let base_url = Url::parse(&settings.base_url)
      .with_context(|| format!("invalid source.base_url {:?}", settings.base_url))?;
    if base_url.cannot_be_a_base() {
      bail!("source.base_url {:?} cannot be used as a base URL", settings.base_url);
    }

    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;

    Ok(Self {
      client,
      base_url,
      api_key: settings.api_key.clone(),
      per_page: settings.per_page,
    })
  }

  fn events_url(&self, artist_id: &str) -> Url {
    let mut url = self.base_url.clone();
    // `new` rejects cannot-be-a-base URLs, so segments are always editable.
    if let Ok(mut segments) = url.path_segments_mut() {
      segments.pop_if_empty().extend(["artists", artist_id, "events"]);
    }
    url
  }
}

impl EventSource for HttpSource {
  type Error = SourceError;

  async fn fetch_page(
    &self,
    artist_id: &str,
    window: DateWindow,
    page: u32,
  ) -> Result<Vec<RawEvent>, SourceError> {
    let mut request = self.client.get(self.events_url(artist_id)).query(&[
      ("start_date", window.start.to_string()),
      ("end_date", window.end.to_string()),
      ("page", page.to_string()),
      ("per_page", self.per_page.to_string()),
    ]);
    if let Some(key) = &self.api_key {
      request = request.bearer_auth(key);
    }

    let response = request.send().await?;
    if !response.status().is_success() {
      return Err(SourceError::Status {
        status: response.status(),
        artist_id: artist_id.to_owned(),
        page,
      });
    }

    let body: EventPage = response.json().await?;
    tracing::debug!(artist = artist_id, page, events = body.events.len(), "source page");
    Ok(body.events)
  }
}
