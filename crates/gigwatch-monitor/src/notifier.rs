//! Digest composition and dispatch.
//!
//! A batch of new events becomes exactly one push message. Formatting is a
//! pure function of the input order, so the same batch always produces the
//! same digest.

use gigwatch_core::{
  event::EventRecord,
  transport::{Digest, Priority, Transport},
};

/// Entries listed in a batch body before the remainder is summarised.
pub const DEFAULT_MAX_LISTED: usize = 15;

/// Formats events into digests and hands them to a [`Transport`].
///
/// Never retries: a failed send is returned to the caller, whose
/// "mark only after a confirmed send" rule makes the next run the retry.
#[derive(Debug, Clone)]
pub struct Notifier<T> {
  transport:  T,
  max_listed: usize,
}

impl<T: Transport> Notifier<T> {
  pub fn new(transport: T) -> Self {
    Self { transport, max_listed: DEFAULT_MAX_LISTED }
  }

  /// Cap the number of entries spelled out in a batch body (minimum 1).
  pub fn with_max_listed(mut self, max_listed: usize) -> Self {
    self.max_listed = max_listed.max(1);
    self
  }

  pub fn transport(&self) -> &T { &self.transport }

  /// Send one digest covering all of `events`.
  ///
  /// Returns the number of events announced; `0` means `events` was empty
  /// and nothing was sent.
  pub async fn dispatch(
    &self,
    events: &[EventRecord],
    location: &str,
  ) -> Result<usize, T::Error> {
    let Some(digest) = self.compose_batch(events, location) else {
      return Ok(0);
    };
    self.transport.send(&digest).await?;
    tracing::info!(events = events.len(), "digest sent");
    Ok(events.len())
  }

  /// Send a digest for a single event at normal priority.
  pub async fn dispatch_single(
    &self,
    event: &EventRecord,
    location: &str,
  ) -> Result<(), T::Error> {
    let digest = self.compose_single(event, location);
    self.transport.send(&digest).await
  }

  pub fn compose_batch(&self, events: &[EventRecord], location: &str) -> Option<Digest> {
    let first = events.first()?;

    let noun = if events.len() == 1 { "event" } else { "events" };
    let title = format!("{} new {noun} in {location}", events.len());

    let mut entries: Vec<String> =
      events.iter().take(self.max_listed).map(entry).collect();
    if events.len() > self.max_listed {
      entries.push(format!("…and {} more", events.len() - self.max_listed));
    }

    Some(Digest {
      title,
      body: entries.join("\n\n"),
      priority: Priority::HIGH,
      click: first.event.url.clone(),
    })
  }

  pub fn compose_single(&self, event: &EventRecord, location: &str) -> Digest {
    Digest {
      title:    format!("{} ({location})", event.event.title),
      body:     entry(event),
      priority: Priority::NORMAL,
      click:    event.event.url.clone(),
    }
  }
}

/// `"Mon 02 Nov · Venue · Artist, Artist"` plus the link on its own line.
fn entry(record: &EventRecord) -> String {
  let event = &record.event;
  let venue = event.venue_name.as_deref().unwrap_or("Venue TBA");
  let mut line = format!(
    "{} · {venue} · {}",
    event.date.format("%a %d %b"),
    record.artist_summary(),
  );
  if let Some(url) = &event.url {
    line.push('\n');
    line.push_str(url);
  }
  line
}

#[cfg(test)]
mod tests {
  use std::convert::Infallible;

  use chrono::{NaiveDate, TimeZone, Utc};
  use gigwatch_core::event::{Event, EventArtist};

  use super::*;

  struct NullTransport;

  impl Transport for NullTransport {
    type Error = Infallible;

    async fn send(&self, _digest: &Digest) -> Result<(), Infallible> { Ok(()) }
  }

  fn record(id: &str, day: u32, venue: Option<&str>, artists: &[&str]) -> EventRecord {
    let date = NaiveDate::from_ymd_opt(2026, 11, day).unwrap();
    let at = Utc.from_utc_datetime(&date.and_hms_opt(20, 0, 0).unwrap());
    EventRecord {
      event:   Event {
        id:            id.into(),
        title:         format!("Show {id}"),
        date,
        starts_at:     at,
        ends_at:       None,
        venue_name:    venue.map(Into::into),
        venue_id:      None,
        url:           Some(format!("https://events.example/{id}")),
        attendance:    0,
        ticketed:      false,
        queue_enabled: false,
        new_listing:   false,
        created_at:    at,
        updated_at:    at,
      },
      artists: artists
        .iter()
        .map(|name| EventArtist {
          event_id:    id.into(),
          artist_id:   name.to_lowercase(),
          artist_name: (*name).into(),
        })
        .collect(),
    }
  }

  #[test]
  fn empty_batch_composes_nothing() {
    let n = Notifier::new(NullTransport);
    assert!(n.compose_batch(&[], "Berlin").is_none());
  }

  #[test]
  fn batch_title_counts_events() {
    let n = Notifier::new(NullTransport);
    let one = n.compose_batch(&[record("e1", 2, None, &["Alpha"])], "Berlin").unwrap();
    assert_eq!(one.title, "1 new event in Berlin");

    let two = n
      .compose_batch(
        &[record("e1", 2, None, &["Alpha"]), record("e2", 5, None, &["Beta"])],
        "Berlin",
      )
      .unwrap();
    assert_eq!(two.title, "2 new events in Berlin");
    assert_eq!(two.priority, Priority::HIGH);
    assert_eq!(two.click.as_deref(), Some("https://events.example/e1"));
  }

  #[test]
  fn batch_body_lists_date_venue_artists_and_link() {
    let n = Notifier::new(NullTransport);
    let digest = n
      .compose_batch(
        &[
          record("e1", 2, Some("The Hall"), &["Alpha", "Beta"]),
          record("e2", 5, None, &["Gamma"]),
        ],
        "Berlin",
      )
      .unwrap();

    assert_eq!(
      digest.body,
      "Mon 02 Nov · The Hall · Alpha, Beta\nhttps://events.example/e1\n\n\
       Thu 05 Nov · Venue TBA · Gamma\nhttps://events.example/e2"
    );
  }

  #[test]
  fn batch_body_is_truncated() {
    let n = Notifier::new(NullTransport).with_max_listed(2);
    let events: Vec<_> = (1..=5)
      .map(|d| record(&format!("e{d}"), d, None, &["Alpha"]))
      .collect();
    let digest = n.compose_batch(&events, "Berlin").unwrap();

    assert_eq!(digest.title, "5 new events in Berlin");
    assert_eq!(digest.body.matches("https://").count(), 2);
    assert!(digest.body.ends_with("…and 3 more"));
  }

  #[test]
  fn single_uses_normal_priority() {
    let n = Notifier::new(NullTransport);
    let digest = n.compose_single(&record("e1", 2, Some("The Hall"), &["Alpha"]), "Berlin");
    assert_eq!(digest.priority, Priority::NORMAL);
    assert_eq!(digest.title, "Show e1 (Berlin)");
  }

  #[tokio::test]
  async fn dispatch_of_empty_batch_is_a_no_op() {
    let n = Notifier::new(NullTransport);
    assert_eq!(n.dispatch(&[], "Berlin").await.unwrap(), 0);
  }
}
