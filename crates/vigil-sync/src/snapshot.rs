//! The dashboard read model.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use vigil_core::{FilterCriteria, Ticket};

/// One coherent view of the dashboard at a point in time.
///
/// The engine rebuilds the whole snapshot after every mutation and
/// publishes it atomically, so an observer never sees records from one
/// attempt paired with flags from another. Snapshots are cheap to clone;
/// the record collections are shared, not copied.
#[derive(Debug, Clone, Default)]
pub struct DashboardSnapshot {
  /// The last successfully fetched collection, replaced wholesale.
  pub records:        Arc<Vec<Ticket>>,
  /// `records` narrowed by `criteria`, input order preserved.
  pub visible:        Arc<Vec<Ticket>>,
  /// True only while the very first fetch attempt is outstanding.
  pub is_loading:     bool,
  /// True only while a post-initialization attempt is outstanding.
  pub is_refreshing:  bool,
  /// Set by the first successful load; never reverts afterwards.
  pub is_initialized: bool,
  /// When `records` was last replaced.
  pub last_updated:   Option<DateTime<Utc>>,
  /// User-facing failure text. Only ever set before initialization;
  /// later failures are logged and otherwise invisible here.
  pub error:          Option<String>,
  /// The criteria `visible` was computed with.
  pub criteria:       FilterCriteria,
  /// Ticket picked for the detail view, cloned at selection time, so it
  /// stays intact even when a refresh replaces the collection under it.
  pub selected:       Option<Ticket>,
  /// Whether the detail view is open. Set and cleared with `selected`.
  pub detail_open:    bool,
}
