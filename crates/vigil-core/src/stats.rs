//! Headline counts for the dashboard summary row.

use crate::ticket::{ActionStatus, Category, Severity, Ticket, TicketStatus};

/// Aggregate counts over the full ticket collection.
///
/// Never stored, always recomputed from the records in hand, so the
/// numbers can never drift from what the table shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TicketStats {
  pub total:               usize,
  pub critical:            usize,
  pub pending_actions:     usize,
  pub auto_actions:        usize,
  pub manual_actions:      usize,
  pub kubernetes:          usize,
  pub kubernetes_critical: usize,
  pub open:                usize,
  pub in_progress:         usize,
  pub solved:              usize,
}

impl TicketStats {
  /// Tally everything in a single pass.
  pub fn collect(records: &[Ticket]) -> Self {
    let mut stats = Self::default();
    for ticket in records {
      stats.total += 1;
      if ticket.severity == Severity::Critical {
        stats.critical += 1;
      }
      match ticket.action_status {
        ActionStatus::Pending => stats.pending_actions += 1,
        ActionStatus::Auto => stats.auto_actions += 1,
        ActionStatus::Manual => stats.manual_actions += 1,
        ActionStatus::Unknown => {}
      }
      if ticket.category == Category::Kubernetes {
        stats.kubernetes += 1;
        if ticket.severity == Severity::Critical {
          stats.kubernetes_critical += 1;
        }
      }
      match ticket.status {
        TicketStatus::Open => stats.open += 1,
        TicketStatus::InProgress => stats.in_progress += 1,
        TicketStatus::Solved => stats.solved += 1,
        _ => {}
      }
    }
    stats
  }
}
