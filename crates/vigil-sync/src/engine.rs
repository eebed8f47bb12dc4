//! The cancellation-aware sync loop.
//!
//! One tokio task owns every piece of mutable dashboard state. Handles
//! send commands over an unbounded channel, fetch attempts run as spawned
//! tasks and report back over a second channel, and every mutation
//! republishes the snapshot over a watch channel. Nothing here locks,
//! because nothing is shared.
//!
//! # Attempt generations
//!
//! Each fetch attempt captures a generation number. Starting a new
//! attempt (timer tick, manual refresh) increments the counter and aborts
//! the superseded task; a completion is applied only while its generation
//! is still current. A slow stale response therefore can never overwrite
//! a newer one, even when the abort loses the race against a result that
//! already reached the completion channel.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::{
  sync::{mpsc, watch},
  task::JoinHandle,
  time::{self, Interval, MissedTickBehavior},
};
use tracing::{debug, info, warn};
use vigil_core::{FilterCriteria, FilterField, Ticket, filter};

use crate::{
  client::ApiClient, error::FetchError, snapshot::DashboardSnapshot,
};

// ─── Options ─────────────────────────────────────────────────────────────

/// Tuning for [`SyncEngine::start`].
#[derive(Debug, Clone)]
pub struct SyncOptions {
  /// Delay between background refreshes once the first load succeeded.
  pub refresh_interval: Duration,
  /// When false no timer is ever armed; only the initial load and manual
  /// refreshes fetch.
  pub enable_realtime:  bool,
}

impl Default for SyncOptions {
  fn default() -> Self {
    Self {
      refresh_interval: Duration::from_secs(3),
      enable_realtime:  true,
    }
  }
}

// ─── Messages ────────────────────────────────────────────────────────────

enum Command {
  Refresh,
  SetFilter(FilterField, String),
  ClearFilters,
  Select(Ticket),
  Dismiss,
  Stop,
}

/// Completion report from a spawned fetch task.
struct AttemptDone {
  generation: u64,
  result:     Result<Vec<Ticket>, FetchError>,
}

// ─── Phase ───────────────────────────────────────────────────────────────

/// The sync state machine. Exactly one phase holds at a time, so the
/// loading and refreshing indicators can never both be set, and
/// initialization is monotonic because no transition leaves `Idle` or
/// `Refreshing` for a pre-init phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
  /// Nothing loaded yet and nothing in flight.
  Uninitialized,
  /// The first load, or a retry of it, is outstanding.
  LoadingInitial,
  /// Initialized with no attempt in flight.
  Idle,
  /// Initialized with a background or manual attempt outstanding.
  Refreshing,
}

impl Phase {
  fn is_initialized(self) -> bool {
    matches!(self, Phase::Idle | Phase::Refreshing)
  }
}

// ─── Engine ──────────────────────────────────────────────────────────────

/// Owner of the background sync task.
///
/// [`SyncEngine::start`] spawns the task and immediately begins the
/// initial load. Dropping the engine aborts the task outright; prefer
/// [`SyncEngine::stop`] for an orderly wind-down.
pub struct SyncEngine {
  handle: DashboardHandle,
  task:   Option<JoinHandle<()>>,
}

impl SyncEngine {
  pub fn start(client: ApiClient, options: SyncOptions) -> Self {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (done_tx, done_rx) = mpsc::unbounded_channel();
    let (snap_tx, snap_rx) = watch::channel(DashboardSnapshot::default());

    debug!(
      interval_ms = options.refresh_interval.as_millis() as u64,
      realtime = options.enable_realtime,
      "starting sync engine"
    );

    let worker = Worker {
      client,
      options,
      snap_tx,
      done_tx,
      phase: Phase::Uninitialized,
      records: Arc::new(Vec::new()),
      visible: Arc::new(Vec::new()),
      criteria: FilterCriteria::default(),
      selected: None,
      detail_open: false,
      last_updated: None,
      error: None,
      generation: 0,
      inflight: None,
      ticker: None,
    };
    let task = tokio::spawn(worker.run(cmd_rx, done_rx));

    Self {
      handle: DashboardHandle { cmd: cmd_tx, snap: snap_rx },
      task:   Some(task),
    }
  }

  /// A clonable action surface for front ends.
  pub fn handle(&self) -> DashboardHandle {
    self.handle.clone()
  }

  /// Stop the loop and wait for it to wind down. The timer is dropped
  /// and any in-flight fetch is aborted, so nothing can mutate or
  /// publish state afterwards.
  pub async fn stop(mut self) {
    let _ = self.handle.cmd.send(Command::Stop);
    if let Some(task) = self.task.take() {
      let _ = task.await;
    }
  }
}

impl Drop for SyncEngine {
  fn drop(&mut self) {
    if let Some(task) = &self.task {
      task.abort();
    }
  }
}

// ─── Handle ──────────────────────────────────────────────────────────────

/// Cheap-to-clone action surface over a running [`SyncEngine`].
///
/// Commands are fire-and-forget; the engine task applies them in order.
/// Once the engine has stopped they become no-ops.
#[derive(Clone)]
pub struct DashboardHandle {
  cmd:  mpsc::UnboundedSender<Command>,
  snap: watch::Receiver<DashboardSnapshot>,
}

impl DashboardHandle {
  /// The most recently published snapshot.
  pub fn snapshot(&self) -> DashboardSnapshot {
    self.snap.borrow().clone()
  }

  /// A receiver for awaiting snapshot changes, e.g. with
  /// `rx.wait_for(|s| s.is_initialized)`.
  pub fn watch(&self) -> watch::Receiver<DashboardSnapshot> {
    self.snap.clone()
  }

  /// Fetch now, superseding any attempt already in flight.
  pub fn refresh(&self) {
    let _ = self.cmd.send(Command::Refresh);
  }

  /// Replace one filter criterion and recompute the visible subset.
  pub fn set_filter(&self, field: FilterField, value: impl Into<String>) {
    let _ = self.cmd.send(Command::SetFilter(field, value.into()));
  }

  /// Reset all criteria to unconstrained.
  pub fn clear_filters(&self) {
    let _ = self.cmd.send(Command::ClearFilters);
  }

  /// Open the detail view on `ticket`.
  pub fn select(&self, ticket: Ticket) {
    let _ = self.cmd.send(Command::Select(ticket));
  }

  /// Close the detail view and drop the selection.
  pub fn dismiss(&self) {
    let _ = self.cmd.send(Command::Dismiss);
  }
}

// ─── Worker ──────────────────────────────────────────────────────────────

/// All mutable sync state, owned by the spawned task.
struct Worker {
  client:  ApiClient,
  options: SyncOptions,
  snap_tx: watch::Sender<DashboardSnapshot>,
  done_tx: mpsc::UnboundedSender<AttemptDone>,

  phase:        Phase,
  records:      Arc<Vec<Ticket>>,
  visible:      Arc<Vec<Ticket>>,
  criteria:     FilterCriteria,
  selected:     Option<Ticket>,
  detail_open:  bool,
  last_updated: Option<DateTime<Utc>>,
  error:        Option<String>,

  generation: u64,
  inflight:   Option<JoinHandle<()>>,
  ticker:     Option<Interval>,
}

impl Worker {
  async fn run(
    mut self,
    mut commands: mpsc::UnboundedReceiver<Command>,
    mut completions: mpsc::UnboundedReceiver<AttemptDone>,
  ) {
    self.begin_attempt(Phase::LoadingInitial);
    self.publish();

    loop {
      tokio::select! {
        cmd = commands.recv() => {
          let keep_going = match cmd {
            Some(cmd) => self.handle_command(cmd),
            None => false,
          };
          if !keep_going {
            break;
          }
        }
        Some(done) = completions.recv() => {
          self.handle_completion(done);
        }
        _ = next_tick(&mut self.ticker) => {
          self.begin_attempt(Phase::Refreshing);
          self.publish();
        }
      }
    }

    if let Some(task) = self.inflight.take() {
      task.abort();
    }
    debug!("sync loop stopped");
  }

  /// Apply one command. Returns false when the loop should stop.
  fn handle_command(&mut self, cmd: Command) -> bool {
    match cmd {
      Command::Stop => return false,
      Command::Refresh => {
        let phase = if self.phase.is_initialized() {
          Phase::Refreshing
        } else {
          Phase::LoadingInitial
        };
        self.begin_attempt(phase);
      }
      Command::SetFilter(field, value) => {
        self.criteria.set(field, value);
        self.refilter();
      }
      Command::ClearFilters => {
        self.criteria.clear();
        self.refilter();
      }
      Command::Select(ticket) => {
        self.selected = Some(ticket);
        self.detail_open = true;
      }
      Command::Dismiss => {
        self.selected = None;
        self.detail_open = false;
      }
    }
    self.publish();
    true
  }

  /// Start a fetch attempt in a spawned task, superseding any attempt
  /// still in flight.
  fn begin_attempt(&mut self, phase: Phase) {
    self.generation += 1;
    let generation = self.generation;

    // Best-effort abort of the superseded request. Correctness does not
    // depend on it landing; the generation check already guarantees the
    // stale result is discarded.
    if let Some(task) = self.inflight.take() {
      task.abort();
      debug!(generation, "superseding in-flight fetch attempt");
    }

    self.phase = phase;
    self.error = None;

    let client = self.client.clone();
    let done_tx = self.done_tx.clone();
    self.inflight = Some(tokio::spawn(async move {
      let result = client.fetch_all().await;
      let _ = done_tx.send(AttemptDone { generation, result });
    }));
  }

  /// Apply a finished attempt, unless a newer one superseded it.
  fn handle_completion(&mut self, done: AttemptDone) {
    if done.generation != self.generation {
      debug!(
        generation = done.generation,
        current = self.generation,
        "discarding stale fetch result"
      );
      return;
    }
    self.inflight = None;

    match done.result {
      Ok(tickets) => {
        let first = !self.phase.is_initialized();
        self.records = Arc::new(tickets);
        self.last_updated = Some(Utc::now());
        self.error = None;
        self.phase = Phase::Idle;
        self.refilter();
        if first {
          info!(count = self.records.len(), "initial ticket load complete");
          self.arm_ticker();
        } else {
          debug!(count = self.records.len(), "ticket collection refreshed");
        }
      }
      Err(err) => {
        if self.phase.is_initialized() {
          // A failed background refresh stays out of the snapshot; the
          // last good collection keeps displaying and the next attempt
          // retries from scratch.
          warn!(error = %err, "background refresh failed");
          self.phase = Phase::Idle;
        } else {
          warn!(error = %err, "initial ticket load failed");
          self.error = Some(format!("failed to load tickets: {err}"));
          self.phase = Phase::Uninitialized;
        }
      }
    }
    self.publish();
  }

  /// Arm the background refresh timer, one full period out. Runs once,
  /// after the first successful load; a collection that has never loaded
  /// has nothing worth refreshing.
  fn arm_ticker(&mut self) {
    if !self.options.enable_realtime || self.ticker.is_some() {
      return;
    }
    let period = self.options.refresh_interval;
    if period.is_zero() {
      warn!("refresh interval is zero; background refresh disabled");
      return;
    }
    let mut ticker = time::interval_at(time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    self.ticker = Some(ticker);
  }

  /// Recompute the visible subset from the records and criteria in hand.
  fn refilter(&mut self) {
    self.visible = Arc::new(filter::apply(&self.records, &self.criteria));
  }

  /// Rebuild the snapshot and hand it to every subscriber. Assembled
  /// whole before the send, so observers never see a half-applied
  /// mutation.
  fn publish(&self) {
    self.snap_tx.send_replace(DashboardSnapshot {
      records:        Arc::clone(&self.records),
      visible:        Arc::clone(&self.visible),
      is_loading:     self.phase == Phase::LoadingInitial,
      is_refreshing:  self.phase == Phase::Refreshing,
      is_initialized: self.phase.is_initialized(),
      last_updated:   self.last_updated,
      error:          self.error.clone(),
      criteria:       self.criteria.clone(),
      selected:       self.selected.clone(),
      detail_open:    self.detail_open,
    });
  }
}

/// Resolves on the next timer tick, or never while no timer is armed
/// (before initialization, or with realtime disabled).
async fn next_tick(ticker: &mut Option<Interval>) {
  match ticker {
    Some(ticker) => {
      ticker.tick().await;
    }
    None => std::future::pending().await,
  }
}
