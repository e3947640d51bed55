//! [`NtfyTransport`] — delivers digests to an ntfy topic.
//!
//! Title, priority, tags and click link travel as query parameters so that
//! non-ASCII text (venue names, locations) never has to fit in a header.

use std::time::Duration;

use anyhow::Context as _;
use gigwatch_core::transport::{Digest, Transport};
use reqwest::{Client, StatusCode, Url};
use thiserror::Error;

use crate::config::NtfySettings;

#[derive(Debug, Error)]
pub enum NtfyError {
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("ntfy answered {0}")]
  Status(StatusCode),
}

#[derive(Clone)]
pub struct NtfyTransport {
  client:   Client,
  endpoint: Url,
  token:    Option<String>,
}

impl NtfyTransport {
  pub fn new(settings: &NtfySettings) -> anyhow::Result<Self> {
    let endpoint = format!("{}/{}", settings.server.trim_end_matches('/'), settings.topic);
    let endpoint = Url::parse(&endpoint)
      .with_context(|| format!("invalid ntfy endpoint {endpoint:?}"))?;

    let client = Client::builder()
      .timeout(Duration::from_secs(15))
      .build()
      .context("failed to build HTTP client")?;

    Ok(Self { client, endpoint, token: settings.token.clone() })
  }
}

impl Transport for NtfyTransport {
  type Error = NtfyError;

  async fn send(&self, digest: &Digest) -> Result<(), NtfyError> {
    let mut params = vec![
      ("title", digest.title.clone()),
      ("priority", digest.priority.get().to_string()),
      ("tags", "tickets".to_owned()),
    ];
    if let Some(click) = &digest.click {
      params.push(("click", click.clone()));
    }

    let mut request = self
      .client
      .post(self.endpoint.clone())
      .query(&params)
      .body(digest.body.clone());
    if let Some(token) = &self.token {
      request = request.bearer_auth(token);
    }

    let response = request.send().await?;
    if !response.status().is_success() {
      return Err(NtfyError::Status(response.status()));
    }
    Ok(())
  }
}
