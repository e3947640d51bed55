//! Runtime configuration, deserialised from `gigwatch.toml` and `GIGWATCH_*`
//! environment variables.
//!
//! The loaded [`Settings`] are turned into explicit values
//! ([`MonitorConfig`], [`WindowPolicy`]) that are handed to the monitor; no
//! component reads configuration from global state.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::{Context as _, bail};
use gigwatch_core::{artist::Artist, window::WindowPolicy};
use gigwatch_monitor::MonitorConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  #[serde(default = "default_store_path")]
  pub store_path:              PathBuf,
  /// Region label used in digest titles.
  pub location:                String,
  #[serde(default)]
  pub artists:                 Vec<Artist>,
  #[serde(default = "default_date_range_days")]
  pub date_range_days:         u32,
  #[serde(default)]
  pub include_past_day_offset: u32,
  #[serde(default = "default_inter_artist_delay_ms")]
  pub inter_artist_delay_ms:   u64,
  #[serde(default = "default_force_page_cap")]
  pub force_page_cap:          u32,
  #[serde(default = "default_check_interval_minutes")]
  pub check_interval_minutes:  u64,
  pub source:                  SourceSettings,
  pub ntfy:                    NtfySettings,
  #[serde(default)]
  pub api:                     ApiSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceSettings {
  pub base_url: String,
  pub api_key:  Option<String>,
  #[serde(default = "default_per_page")]
  pub per_page: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NtfySettings {
  #[serde(default = "default_ntfy_server")]
  pub server: String,
  pub topic:  String,
  pub token:  Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
  pub host: String,
  pub port: u16,
}

impl Default for ApiSettings {
  fn default() -> Self {
    Self { host: "127.0.0.1".into(), port: 8080 }
  }
}

fn default_store_path() -> PathBuf { PathBuf::from("gigwatch.db") }
fn default_date_range_days() -> u32 { 90 }
fn default_inter_artist_delay_ms() -> u64 { 2_000 }
fn default_force_page_cap() -> u32 { 3 }
fn default_check_interval_minutes() -> u64 { 60 }
fn default_per_page() -> u32 { 50 }
fn default_ntfy_server() -> String { "https://ntfy.sh".into() }

impl Settings {
  /// Layer the TOML file at `path` (optional) under `GIGWATCH_*` variables.
  /// Nested keys use `__`, e.g. `GIGWATCH_NTFY__TOPIC`.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let builder = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("GIGWATCH")
          .prefix_separator("_")
          .separator("__"),
      );
    Self::build(builder)
  }

  fn build(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
  ) -> anyhow::Result<Self> {
    let settings: Self = builder
      .build()
      .context("failed to read configuration")?
      .try_deserialize()
      .context("failed to deserialise configuration")?;
    settings.validate()?;
    Ok(settings)
  }

  fn validate(&self) -> anyhow::Result<()> {
    if self.check_interval_minutes == 0 {
      bail!("check_interval_minutes must be at least 1");
    }
    if self.source.per_page == 0 {
      bail!("source.per_page must be at least 1");
    }
    if let Some(artist) = self.artists.iter().find(|a| a.id.trim().is_empty()) {
      bail!("artist {:?} has an empty id", artist.name);
    }
    if let Some(artist) = self.artists.iter().find(|a| a.name.trim().is_empty()) {
      bail!("artist {:?} has an empty name", artist.id);
    }
    Ok(())
  }

  pub fn monitor_config(&self) -> MonitorConfig {
    MonitorConfig {
      artists:            self.artists.clone(),
      location:           self.location.clone(),
      inter_artist_delay: Duration::from_millis(self.inter_artist_delay_ms),
      force_page_cap:     self.force_page_cap,
    }
  }

  pub fn window_policy(&self) -> WindowPolicy {
    WindowPolicy {
      include_past_day_offset: self.include_past_day_offset,
      date_range_days:         self.date_range_days,
    }
  }

  pub fn check_interval(&self) -> Duration {
    Duration::from_secs(self.check_interval_minutes * 60)
  }

  /// `store_path` with a leading `~` expanded to the user's home directory.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  const MINIMAL: &str = r#"
    location = "Berlin"

    [[artists]]
    id = "a1"
    name = "Alpha"

    [[artists]]
    id = "b2"
    name = "Beta"

    [source]
    base_url = "https://events.example/api"

    [ntfy]
    topic = "gigs"
  "#;

  fn parse(toml: &str) -> anyhow::Result<Settings> {
    Settings::build(
      config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml)),
    )
  }

  #[test]
  fn defaults_fill_optional_fields() {
    let s = parse(MINIMAL).unwrap();
    assert_eq!(s.artists.len(), 2);
    assert_eq!(s.artists[1], Artist::new("b2", "Beta"));
    assert_eq!(s.date_range_days, 90);
    assert_eq!(s.include_past_day_offset, 0);
    assert_eq!(s.ntfy.server, "https://ntfy.sh");
    assert_eq!(s.source.per_page, 50);
    assert_eq!(s.api.port, 8080);
    assert_eq!(s.check_interval(), Duration::from_secs(3600));
  }

  #[test]
  fn monitor_config_carries_pacing_and_artists() {
    let s = parse(&format!("inter_artist_delay_ms = 0\nforce_page_cap = 5\n{MINIMAL}")).unwrap();
    let mc = s.monitor_config();
    assert_eq!(mc.inter_artist_delay, Duration::ZERO);
    assert_eq!(mc.force_page_cap, 5);
    assert_eq!(mc.location, "Berlin");
    assert_eq!(mc.artists.len(), 2);
  }

  #[test]
  fn window_policy_reflects_offsets() {
    let s = parse(&format!("date_range_days = 30\ninclude_past_day_offset = 2\n{MINIMAL}"))
      .unwrap();
    assert_eq!(
      s.window_policy(),
      WindowPolicy { include_past_day_offset: 2, date_range_days: 30 }
    );
  }

  #[test]
  fn zero_interval_is_rejected() {
    let err = parse(&format!("check_interval_minutes = 0\n{MINIMAL}")).unwrap_err();
    assert!(err.to_string().contains("check_interval_minutes"));
  }

  #[test]
  fn blank_artist_name_is_rejected() {
    let toml = MINIMAL.replace(r#"name = "Beta""#, r#"name = "  ""#);
    let err = parse(&toml).unwrap_err();
    assert!(err.to_string().contains("empty name"));
  }

  #[test]
  fn missing_ntfy_section_is_rejected() {
    let toml = r#"
      location = "Berlin"
      [source]
      base_url = "https://events.example/api"
    "#;
    assert!(parse(toml).is_err());
  }
}
