//! Client-side filter pipeline.
//!
//! Derives the visible subset of an already-fetched ticket collection.
//! Criteria are plain strings so a front end can bind them straight to
//! inputs; the empty string means "no constraint". Non-empty criteria
//! combine with AND, and [`apply`] is pure: same records and criteria in,
//! same subset out, input order preserved.

use serde::{Deserialize, Serialize};

use crate::ticket::Ticket;

// ─── Criteria ────────────────────────────────────────────────────────────

/// The seven independently editable filter fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
  Search,
  Severity,
  Category,
  IncidentType,
  Environment,
  ActionStatus,
  Status,
}

/// Active filter constraints, one string per field.
///
/// `search` scans title, description, and report case-insensitively; the
/// six other fields match their classification exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
  pub search:        String,
  pub severity:      String,
  pub category:      String,
  pub incident_type: String,
  pub environment:   String,
  pub action_status: String,
  pub status:        String,
}

impl FilterCriteria {
  /// Replace a single criterion, leaving the other six untouched.
  pub fn set(&mut self, field: FilterField, value: impl Into<String>) {
    let value = value.into();
    match field {
      FilterField::Search => self.search = value,
      FilterField::Severity => self.severity = value,
      FilterField::Category => self.category = value,
      FilterField::IncidentType => self.incident_type = value,
      FilterField::Environment => self.environment = value,
      FilterField::ActionStatus => self.action_status = value,
      FilterField::Status => self.status = value,
    }
  }

  /// Reset every field to "no constraint".
  pub fn clear(&mut self) {
    *self = Self::default();
  }

  /// True when no field constrains anything.
  pub fn is_empty(&self) -> bool {
    self.search.is_empty()
      && self.severity.is_empty()
      && self.category.is_empty()
      && self.incident_type.is_empty()
      && self.environment.is_empty()
      && self.action_status.is_empty()
      && self.status.is_empty()
  }
}

// ─── Pipeline ────────────────────────────────────────────────────────────

/// Narrow `records` to the tickets satisfying every non-empty criterion.
///
/// Exact-match fields run first; the free-text scan runs last so the most
/// expensive predicate sees the smallest set. With all-empty criteria the
/// full collection comes back unchanged.
pub fn apply(records: &[Ticket], criteria: &FilterCriteria) -> Vec<Ticket> {
  if criteria.is_empty() {
    return records.to_vec();
  }

  let mut visible: Vec<&Ticket> = records.iter().collect();

  if !criteria.severity.is_empty() {
    visible.retain(|t| t.severity.matches(&criteria.severity));
  }
  if !criteria.category.is_empty() {
    visible.retain(|t| t.category.matches(&criteria.category));
  }
  if !criteria.incident_type.is_empty() {
    visible.retain(|t| t.incident_type.matches(&criteria.incident_type));
  }
  if !criteria.environment.is_empty() {
    visible.retain(|t| t.environment.matches(&criteria.environment));
  }
  if !criteria.action_status.is_empty() {
    visible.retain(|t| t.action_status.matches(&criteria.action_status));
  }
  if !criteria.status.is_empty() {
    visible.retain(|t| t.status.matches(&criteria.status));
  }
  if !criteria.search.is_empty() {
    visible.retain(|t| matches_search(t, &criteria.search));
  }

  visible.into_iter().cloned().collect()
}

/// Case-insensitive substring match over the three free-text fields.
fn matches_search(ticket: &Ticket, term: &str) -> bool {
  let needle = term.to_lowercase();
  ticket.title.to_lowercase().contains(&needle)
    || ticket.description.to_lowercase().contains(&needle)
    || ticket.report.to_lowercase().contains(&needle)
}
