//! `gigwatch` — watches event listings for a set of artists and sends one
//! digest per run for everything new.
//!
//! # Usage
//!
//! ```text
//! gigwatch check                  # one run over every configured artist
//! gigwatch check --force -a 123   # re-announce everything for one artist
//! gigwatch notify EVENT_ID        # announce a single stored event
//! gigwatch events --unnotified    # what the next run would announce
//! gigwatch serve                  # scheduler + REST API
//! ```
//!
//! Configuration is read from `gigwatch.toml` (or `--config`) and
//! `GIGWATCH_*` environment variables.

mod config;
mod ntfy;
mod serve;
mod source;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context as _, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use gigwatch_core::{
  artist::ArtistSelection,
  event::EventRecord,
  run::RunMode,
  store::EventStore,
};
use gigwatch_monitor::{DispatchOutcome, Monitor, Notifier, NotifyOutcome, RunReport};
use gigwatch_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{config::Settings, ntfy::NtfyTransport, source::HttpSource};

pub(crate) type AppMonitor = Monitor<SqliteStore, HttpSource, NtfyTransport>;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "gigwatch", version, about = "Artist event watcher")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "gigwatch.toml", env = "GIGWATCH_CONFIG")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Run one check now.
  Check {
    /// Re-announce every stored event in the window, notified or not.
    #[arg(long)]
    force:   bool,
    /// Restrict the run to these artist IDs (repeatable).
    #[arg(short, long = "artist", value_name = "ID")]
    artists: Vec<String>,
  },
  /// Send the notification for a single stored event.
  Notify {
    event_id: String,
    /// Send even if the event was already announced.
    #[arg(long)]
    force:    bool,
  },
  /// List stored events in the configured window.
  Events {
    /// Only events no notification has covered yet.
    #[arg(long)]
    unnotified: bool,
  },
  /// Check periodically and serve the REST API.
  Serve,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;
  let monitor = Arc::new(build_monitor(&settings).await?);

  match cli.command {
    Command::Check { force, artists } => {
      let selection = if artists.is_empty() {
        ArtistSelection::All
      } else {
        ArtistSelection::Only(artists)
      };
      let mode = if force { RunMode::Force } else { RunMode::Normal };
      let window = settings.window_policy().window_for(Local::now().date_naive());

      let report = monitor.run_check(&selection, window, mode).await?;
      print_report(&report);
      if let DispatchOutcome::Failed { error } = &report.dispatch {
        bail!("notification failed: {error}");
      }
    }

    Command::Notify { event_id, force } => {
      match monitor.notify_event(&event_id, force).await? {
        NotifyOutcome::Sent => println!("sent {event_id}"),
        NotifyOutcome::AlreadyNotified => {
          println!("{event_id} was already notified (use --force to resend)");
        }
        NotifyOutcome::Failed { error } => bail!("notification failed: {error}"),
      }
    }

    Command::Events { unnotified } => {
      let window = settings.window_policy().window_for(Local::now().date_naive());
      let store = monitor.store();
      let records = if unnotified {
        let ids: Vec<String> = settings.artists.iter().map(|a| a.id.clone()).collect();
        store.unnotified_for_artists(&ids, window).await?
      } else {
        store.events_in_window(window).await?
      };
      for record in &records {
        print_event(record);
      }
      println!("{} event(s) between {} and {}", records.len(), window.start, window.end);
    }

    Command::Serve => serve::run(&settings, monitor).await?,
  }

  Ok(())
}

async fn build_monitor(settings: &Settings) -> anyhow::Result<AppMonitor> {
  let store_path = settings.resolved_store_path();
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let source = HttpSource::new(&settings.source)?;
  let transport = NtfyTransport::new(&settings.ntfy)?;

  Ok(Monitor::new(
    Arc::new(store),
    source,
    Notifier::new(transport),
    settings.monitor_config(),
  ))
}

// ─── Output ───────────────────────────────────────────────────────────────────

fn print_report(report: &RunReport) {
  println!(
    "run {} ({:?}) {} → {}",
    report.run_id, report.mode, report.window.start, report.window.end
  );
  for artist in &report.artists {
    match &artist.error {
      Some(error) => println!("  {:<24} skipped: {error}", artist.artist_name),
      None => println!(
        "  {:<24} {} page(s), {} upserted, {} new",
        artist.artist_name, artist.pages, artist.upserted, artist.new_events
      ),
    }
  }
  match &report.dispatch {
    DispatchOutcome::NothingNew => println!("nothing new"),
    DispatchOutcome::Sent { count } => println!("notified {count} event(s)"),
    DispatchOutcome::Failed { error } => println!("dispatch failed: {error}"),
  }
}

fn print_event(record: &EventRecord) {
  let event = &record.event;
  println!(
    "{}  {:<12} {}  [{}]",
    event.date,
    event.id,
    event.title,
    record.artist_summary()
  );
}
