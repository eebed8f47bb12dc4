//! `vigil`, the terminal front door for the incident ticket dashboard.
//!
//! Prints the visible tickets once with `--once`, or keeps watching and
//! prints a summary line every time the collection changes.
//!
//! # Usage
//!
//! ```text
//! vigil --once --severity critical
//! vigil --url http://tickets.internal:8080 --refresh-ms 5000
//! ```

use std::{path::PathBuf, time::Duration};

use anyhow::{Context as _, Result};
use clap::Parser;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use vigil_core::{FilterCriteria, FilterField, TicketStats};
use vigil_sync::{
  ApiClient, ApiConfig, DashboardHandle, DashboardSnapshot, SyncEngine,
  SyncOptions,
};

// ─── CLI args ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
  name = "vigil",
  about = "Live terminal view of the incident ticket feed"
)]
struct Args {
  /// Path to the TOML settings file.
  #[arg(short, long, default_value = "vigil.toml")]
  config: PathBuf,

  /// Base URL of the ticket API (default http://localhost:8080).
  #[arg(long, env = "VIGIL_URL")]
  url: Option<String>,

  /// Milliseconds between background refreshes.
  #[arg(long, env = "VIGIL_REFRESH_MS")]
  refresh_ms: Option<u64>,

  /// Fetch once, print, and exit instead of watching.
  #[arg(long)]
  once: bool,

  /// Keep watching but never refresh in the background.
  #[arg(long)]
  no_realtime: bool,

  /// Free-text filter over title, description, and report.
  #[arg(long)]
  search: Option<String>,

  /// Exact severity: critical, high, medium, or low.
  #[arg(long)]
  severity: Option<String>,

  /// Exact category: kubernetes, infrastructure, ci-cd, or other.
  #[arg(long)]
  category: Option<String>,

  /// Exact incident type tag, e.g. POD_CRASH or CPU_HIGH.
  #[arg(long = "type")]
  incident_type: Option<String>,

  /// Exact environment: production, staging, or development.
  #[arg(long)]
  environment: Option<String>,

  /// Exact action status: auto, manual, or pending.
  #[arg(long)]
  action: Option<String>,

  /// Exact ticket status, e.g. open or in-progress.
  #[arg(long)]
  status: Option<String>,
}

// ─── Settings ────────────────────────────────────────────────────────────

/// Shape of the optional TOML settings file and the `VIGIL_*`
/// environment variables.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct Settings {
  url:        String,
  refresh_ms: u64,
  realtime:   bool,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      url:        "http://localhost:8080".to_string(),
      refresh_ms: 3000,
      realtime:   true,
    }
  }
}

fn load_settings(args: &Args) -> Result<Settings> {
  let raw = config::Config::builder()
    .add_source(config::File::from(args.config.clone()).required(false))
    .add_source(
      config::Environment::with_prefix("VIGIL").try_parsing(true),
    )
    .build()
    .context("failed to read settings")?;

  let mut settings: Settings = raw
    .try_deserialize()
    .context("failed to deserialise settings")?;

  // Flags override the file and the environment.
  if let Some(url) = &args.url {
    settings.url = url.clone();
  }
  if let Some(ms) = args.refresh_ms {
    settings.refresh_ms = ms;
  }
  if args.no_realtime {
    settings.realtime = false;
  }
  Ok(settings)
}

/// Collect the filter flags into the criteria the engine should run with.
fn criteria_from(args: &Args) -> FilterCriteria {
  let mut criteria = FilterCriteria::default();
  if let Some(v) = &args.search {
    criteria.search = v.clone();
  }
  if let Some(v) = &args.severity {
    criteria.severity = v.clone();
  }
  if let Some(v) = &args.category {
    criteria.category = v.clone();
  }
  if let Some(v) = &args.incident_type {
    criteria.incident_type = v.clone();
  }
  if let Some(v) = &args.environment {
    criteria.environment = v.clone();
  }
  if let Some(v) = &args.action {
    criteria.action_status = v.clone();
  }
  if let Some(v) = &args.status {
    criteria.status = v.clone();
  }
  criteria
}

fn apply_criteria(handle: &DashboardHandle, criteria: &FilterCriteria) {
  if !criteria.search.is_empty() {
    handle.set_filter(FilterField::Search, criteria.search.clone());
  }
  if !criteria.severity.is_empty() {
    handle.set_filter(FilterField::Severity, criteria.severity.clone());
  }
  if !criteria.category.is_empty() {
    handle.set_filter(FilterField::Category, criteria.category.clone());
  }
  if !criteria.incident_type.is_empty() {
    handle
      .set_filter(FilterField::IncidentType, criteria.incident_type.clone());
  }
  if !criteria.environment.is_empty() {
    handle.set_filter(FilterField::Environment, criteria.environment.clone());
  }
  if !criteria.action_status.is_empty() {
    handle
      .set_filter(FilterField::ActionStatus, criteria.action_status.clone());
  }
  if !criteria.status.is_empty() {
    handle.set_filter(FilterField::Status, criteria.status.clone());
  }
}

// ─── Entry point ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();
  let settings = load_settings(&args)?;

  let client = ApiClient::new(ApiConfig {
    base_url: settings.url.clone(),
  })
  .context("failed to build API client")?;

  let engine = SyncEngine::start(client, SyncOptions {
    refresh_interval: Duration::from_millis(settings.refresh_ms),
    enable_realtime:  settings.realtime && !args.once,
  });
  let handle = engine.handle();

  let criteria = criteria_from(&args);
  apply_criteria(&handle, &criteria);

  // Wait until the first attempt settles and the flag criteria are in.
  let mut rx = handle.watch();
  let first = rx
    .wait_for(|s| {
      s.error.is_some() || (s.is_initialized && s.criteria == criteria)
    })
    .await
    .context("sync engine stopped before the first load settled")?
    .clone();

  if let Some(error) = &first.error {
    let message = error.clone();
    engine.stop().await;
    anyhow::bail!(message);
  }

  print_listing(&first);

  if args.once {
    engine.stop().await;
    return Ok(());
  }

  // Watch mode: one line per collection change until Ctrl-C.
  let mut last_seen = first.last_updated;
  loop {
    tokio::select! {
      _ = tokio::signal::ctrl_c() => break,
      changed = rx.changed() => {
        if changed.is_err() {
          break;
        }
        let snapshot = rx.borrow_and_update().clone();
        if snapshot.last_updated != last_seen {
          last_seen = snapshot.last_updated;
          print_update(&snapshot);
        }
      }
    }
  }

  engine.stop().await;
  Ok(())
}

// ─── Output ──────────────────────────────────────────────────────────────

/// The visible records as a table, then the summary counts.
fn print_listing(snapshot: &DashboardSnapshot) {
  for ticket in snapshot.visible.iter() {
    println!(
      "{:<12} {:<9} {:<12} {:<12} {}",
      ticket.id,
      ticket.severity.as_str().unwrap_or("?"),
      ticket.status.as_str().unwrap_or("?"),
      ticket.environment.as_str().unwrap_or("?"),
      ticket.title,
    );
  }

  let stats = TicketStats::collect(&snapshot.records);
  println!(
    "{} shown of {} total | {} critical | {} pending action | {} open",
    snapshot.visible.len(),
    stats.total,
    stats.critical,
    stats.pending_actions,
    stats.open,
  );
  if let Some(updated) = snapshot.last_updated {
    println!("last updated {}", updated.format("%Y-%m-%d %H:%M:%S UTC"));
  }
}

/// One summary line per refresh in watch mode.
fn print_update(snapshot: &DashboardSnapshot) {
  let time = snapshot
    .last_updated
    .map(|t| t.format("%H:%M:%S").to_string())
    .unwrap_or_else(|| "--:--:--".to_string());
  let stats = TicketStats::collect(&snapshot.records);
  println!(
    "[{time}] {} shown of {} total | {} critical | {} open",
    snapshot.visible.len(),
    stats.total,
    stats.critical,
    stats.open,
  );
}

// ─── Tests ───────────────────────────────────────────────────────────────
