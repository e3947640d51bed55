//! [`Monitor`] — runs one check from fetch to notification.
//!
//! A run moves through: resolve artists → per artist (fetch pages → upsert →
//! delta) with a fixed pause between artists → notify once → mark notified.
//! Only one run executes at a time per monitor.

use std::{
  collections::HashSet,
  sync::{Arc, Mutex, PoisonError},
  time::Duration,
};

use gigwatch_core::{
  artist::{Artist, ArtistSelection},
  event::EventRecord,
  run::RunMode,
  source::EventSource,
  store::EventStore,
  transport::Transport,
  window::DateWindow,
};
use tokio_util::sync::CancellationToken;
use tracing::Instrument as _;
use uuid::Uuid;

use crate::{
  error::{store_error, IngestError},
  notifier::Notifier,
  report::{ArtistOutcome, DispatchOutcome, NotifyOutcome, RunReport},
  Error, Result,
};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Everything a run needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
  /// Configured artists; a run's [`ArtistSelection`] resolves against these.
  pub artists:            Vec<Artist>,
  /// Region label shown in digests.
  pub location:           String,
  /// Pause between consecutive artists. Zero disables pacing (tests only).
  pub inter_artist_delay: Duration,
  /// Page limit per artist for force runs. Normal runs read until the source
  /// returns an empty page.
  pub force_page_cap:     u32,
}

impl Default for MonitorConfig {
  fn default() -> Self {
    Self {
      artists:            Vec::new(),
      location:           String::new(),
      inter_artist_delay: Duration::from_secs(2),
      force_page_cap:     3,
    }
  }
}

// ─── Run registration ────────────────────────────────────────────────────────

/// Publishes a run's cancellation token for as long as the run future lives,
/// including when the future is dropped early.
struct CurrentRun<'a> {
  slot: &'a Mutex<Option<CancellationToken>>,
}

impl<'a> CurrentRun<'a> {
  fn register(slot: &'a Mutex<Option<CancellationToken>>, token: CancellationToken) -> Self {
    *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token);
    Self { slot }
  }
}

impl Drop for CurrentRun<'_> {
  fn drop(&mut self) {
    *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
  }
}

// ─── Monitor ─────────────────────────────────────────────────────────────────

pub struct Monitor<S, F, T> {
  store:    Arc<S>,
  source:   F,
  notifier: Notifier<T>,
  config:   MonitorConfig,
  run_lock: tokio::sync::Mutex<()>,
  /// Cancellation handle of the in-flight run, if any.
  current:  Mutex<Option<CancellationToken>>,
}

impl<S, F, T> Monitor<S, F, T>
where
  S: EventStore,
  F: EventSource,
  T: Transport,
{
  pub fn new(store: Arc<S>, source: F, notifier: Notifier<T>, config: MonitorConfig) -> Self {
    Self {
      store,
      source,
      notifier,
      config,
      run_lock: tokio::sync::Mutex::new(()),
      current: Mutex::new(None),
    }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn config(&self) -> &MonitorConfig { &self.config }

  pub fn notifier(&self) -> &Notifier<T> { &self.notifier }

  pub fn is_running(&self) -> bool { self.run_lock.try_lock().is_err() }

  /// Cancel the in-flight run at its next artist boundary.
  ///
  /// Returns `false` when no run is in flight.
  pub fn cancel_current(&self) -> bool {
    let current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
    match current.as_ref() {
      Some(token) => {
        token.cancel();
        true
      }
      None => false,
    }
  }

  /// Run one check over `selection` and `window`.
  ///
  /// Configuration problems (unknown or missing artists, reversed window) are
  /// rejected before anything is fetched. A second call while a run is in
  /// flight fails with [`Error::RunInProgress`].
  ///
  /// Per-artist fetch and store failures are logged and recorded in the
  /// report; they never abort the run. A transport failure leaves the whole
  /// batch unmarked. Store failures after ingest (delta computation,
  /// bookkeeping) surface as [`Error::Store`].
  pub async fn run_check(
    &self,
    selection: &ArtistSelection,
    window:    DateWindow,
    mode:      RunMode,
  ) -> Result<RunReport> {
    let window  = DateWindow::new(window.start, window.end)?;
    let artists = selection.resolve(&self.config.artists)?;

    let _guard = self.run_lock.try_lock().map_err(|_| Error::RunInProgress)?;

    let cancel = CancellationToken::new();
    let _current = CurrentRun::register(&self.current, cancel.clone());

    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("run_check", %run_id, ?mode);
    self
      .run_locked(run_id, &artists, window, mode, &cancel)
      .instrument(span)
      .await
  }

  /// Notify a single stored event at normal priority.
  ///
  /// Without `force`, an event that already has a notification row is left
  /// alone. The event is marked only after the send succeeds.
  pub async fn notify_event(&self, event_id: &str, force: bool) -> Result<NotifyOutcome> {
    let _guard = self.run_lock.try_lock().map_err(|_| Error::RunInProgress)?;

    let record = self
      .store
      .get_event(event_id)
      .await
      .map_err(store_error)?
      .ok_or_else(|| Error::EventNotFound(event_id.to_owned()))?;

    if !force && self.store.has_been_notified(event_id).await.map_err(store_error)? {
      tracing::info!(event = event_id, "already notified; skipping");
      return Ok(NotifyOutcome::AlreadyNotified);
    }

    if let Err(e) = self.notifier.dispatch_single(&record, &self.config.location).await {
      tracing::error!(event = event_id, error = %e, "single notification failed");
      return Ok(NotifyOutcome::Failed { error: e.to_string() });
    }

    self
      .store
      .mark_notified(event_id, RunMode::Force.reason())
      .await
      .map_err(store_error)?;
    Ok(NotifyOutcome::Sent)
  }

  async fn run_locked(
    &self,
    run_id:  Uuid,
    artists: &[Artist],
    window:  DateWindow,
    mode:    RunMode,
    cancel:  &CancellationToken,
  ) -> Result<RunReport> {
    tracing::info!(
      artists = artists.len(),
      start = %window.start,
      end = %window.end,
      "starting check"
    );

    let page_cap = match mode {
      RunMode::Normal => None,
      RunMode::Force => Some(self.config.force_page_cap),
    };

    let mut outcomes = Vec::with_capacity(artists.len());
    let mut batch: Vec<EventRecord> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (i, artist) in artists.iter().enumerate() {
      if i > 0 {
        tokio::select! {
          () = cancel.cancelled() => {}
          () = tokio::time::sleep(self.config.inter_artist_delay) => {}
        }
      }
      if cancel.is_cancelled() {
        tracing::warn!(processed = i, "check cancelled");
        return Err(Error::Cancelled);
      }

      let mut outcome = ArtistOutcome::start(artist);
      let ingest = self
        .ingest_artist(artist, window, page_cap, &mut outcome)
        .instrument(tracing::info_span!("artist", artist = %artist.id))
        .await;

      match ingest {
        Ok(()) => {
          if mode == RunMode::Normal {
            let delta = self
              .store
              .unnotified_for_artists(std::slice::from_ref(&artist.id), window)
              .await
              .map_err(store_error)?;
            for record in delta {
              if seen.insert(record.event.id.clone()) {
                outcome.new_events += 1;
                batch.push(record);
              }
            }
          }
          tracing::info!(
            artist = %artist.id,
            pages = outcome.pages,
            upserted = outcome.upserted,
            new_events = outcome.new_events,
            "artist processed"
          );
        }
        Err(e) => {
          tracing::warn!(artist = %artist.id, error = %e, "skipping artist");
          outcome.error = Some(e.to_string());
        }
      }

      outcomes.push(outcome);
    }

    if mode == RunMode::Force {
      batch = self.force_batch(artists, window).await?;
      for outcome in &mut outcomes {
        outcome.new_events = batch
          .iter()
          .filter(|record| mentions(record, &outcome.artist_name))
          .count();
      }
    }

    let mut notified = Vec::new();
    let dispatch = if batch.is_empty() {
      tracing::info!("no new events");
      DispatchOutcome::NothingNew
    } else {
      match self.notifier.dispatch(&batch, &self.config.location).await {
        Ok(count) => {
          for record in &batch {
            self
              .store
              .mark_notified(&record.event.id, mode.reason())
              .await
              .map_err(store_error)?;
            notified.push(record.event.id.clone());
          }
          DispatchOutcome::Sent { count }
        }
        Err(e) => {
          tracing::error!(events = batch.len(), error = %e, "dispatch failed; batch left unmarked");
          DispatchOutcome::Failed { error: e.to_string() }
        }
      }
    };

    Ok(RunReport {
      run_id,
      mode,
      window,
      artists: outcomes,
      notified,
      dispatch,
    })
  }

  /// Fetch and upsert every page for one artist.
  ///
  /// Each upsert commits on its own, so pages stored before a failure stay
  /// stored.
  async fn ingest_artist(
    &self,
    artist:   &Artist,
    window:   DateWindow,
    page_cap: Option<u32>,
    outcome:  &mut ArtistOutcome,
  ) -> Result<(), IngestError> {
    let mut page = 1;
    loop {
      if page_cap.is_some_and(|cap| page > cap) {
        tracing::debug!(page, "page cap reached");
        break;
      }

      let events = self
        .source
        .fetch_page(&artist.id, window, page)
        .await
        .map_err(|e| IngestError::Fetch { page, source: Box::new(e) })?;

      if events.is_empty() {
        break;
      }
      tracing::debug!(page, events = events.len(), "fetched page");
      outcome.pages += 1;

      for raw in &events {
        self
          .store
          .upsert_event(raw)
          .await
          .map_err(|e| IngestError::Store {
            event_id: raw.id.clone(),
            source:   Box::new(e),
          })?;
        outcome.upserted += 1;
      }

      page += 1;
    }
    Ok(())
  }

  /// Every event in the window whose artist summary mentions a selected
  /// artist's display name.
  ///
  /// This is a substring test on names, not an ID join: an artist whose name
  /// contains another selected artist's name also matches.
  async fn force_batch(&self, artists: &[Artist], window: DateWindow) -> Result<Vec<EventRecord>> {
    let events = self
      .store
      .events_in_window(window)
      .await
      .map_err(store_error)?;

    Ok(
      events
        .into_iter()
        .filter(|record| artists.iter().any(|a| mentions(record, &a.name)))
        .collect(),
    )
  }
}

/// Whether `record`'s artist summary contains `name`. A blank name matches
/// nothing.
fn mentions(record: &EventRecord, name: &str) -> bool {
  !name.trim().is_empty() && record.artist_summary().contains(name)
}
