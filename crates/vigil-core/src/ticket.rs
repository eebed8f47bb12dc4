//! The incident ticket model, matching the backend's wire format.
//!
//! Tickets are produced by the ingestion pipeline and served by the ticket
//! API; this side only ever reads them. The classification fields
//! deserialize leniently: a value this build does not recognize (or an
//! absent field) becomes `Unknown`, so one odd record never fails a whole
//! fetch. An `Unknown` field is displayable but never satisfies an
//! exact-match filter criterion.

use serde::{Deserialize, Serialize};

// ─── Classification ──────────────────────────────────────────────────────

/// Incident severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Critical,
  High,
  Medium,
  Low,
  /// Anything on the wire this build does not recognize.
  #[default]
  #[serde(other)]
  Unknown,
}

impl Severity {
  /// The wire spelling, or `None` for [`Severity::Unknown`].
  pub fn as_str(self) -> Option<&'static str> {
    match self {
      Self::Critical => Some("critical"),
      Self::High => Some("high"),
      Self::Medium => Some("medium"),
      Self::Low => Some("low"),
      Self::Unknown => None,
    }
  }

  /// Exact match against a criterion string. `Unknown` matches nothing,
  /// not even the literal string `"unknown"`.
  pub fn matches(self, criterion: &str) -> bool {
    self.as_str() == Some(criterion)
  }
}

/// Broad source area of the incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
  Kubernetes,
  Infrastructure,
  CiCd,
  Other,
  #[default]
  #[serde(other)]
  Unknown,
}

impl Category {
  pub fn as_str(self) -> Option<&'static str> {
    match self {
      Self::Kubernetes => Some("kubernetes"),
      Self::Infrastructure => Some("infrastructure"),
      Self::CiCd => Some("ci-cd"),
      Self::Other => Some("other"),
      Self::Unknown => None,
    }
  }

  pub fn matches(self, criterion: &str) -> bool {
    self.as_str() == Some(criterion)
  }
}

/// Fine-grained incident type tag assigned by the ingestion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentType {
  CpuHigh,
  MemHigh,
  PodCrash,
  ImagePull,
  UnhealthyPod,
  AppError,
  Other,
  #[default]
  #[serde(other)]
  Unknown,
}

impl IncidentType {
  pub fn as_str(self) -> Option<&'static str> {
    match self {
      Self::CpuHigh => Some("CPU_HIGH"),
      Self::MemHigh => Some("MEM_HIGH"),
      Self::PodCrash => Some("POD_CRASH"),
      Self::ImagePull => Some("IMAGE_PULL"),
      Self::UnhealthyPod => Some("UNHEALTHY_POD"),
      Self::AppError => Some("APP_ERROR"),
      Self::Other => Some("OTHER"),
      Self::Unknown => None,
    }
  }

  pub fn matches(self, criterion: &str) -> bool {
    self.as_str() == Some(criterion)
  }
}

/// Deployment environment the incident was observed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
  Production,
  Staging,
  Development,
  #[default]
  #[serde(other)]
  Unknown,
}

impl Environment {
  pub fn as_str(self) -> Option<&'static str> {
    match self {
      Self::Production => Some("production"),
      Self::Staging => Some("staging"),
      Self::Development => Some("development"),
      Self::Unknown => None,
    }
  }

  pub fn matches(self, criterion: &str) -> bool {
    self.as_str() == Some(criterion)
  }
}

/// How remediation is being handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
  Auto,
  Manual,
  Pending,
  #[default]
  #[serde(other)]
  Unknown,
}

impl ActionStatus {
  pub fn as_str(self) -> Option<&'static str> {
    match self {
      Self::Auto => Some("auto"),
      Self::Manual => Some("manual"),
      Self::Pending => Some("pending"),
      Self::Unknown => None,
    }
  }

  pub fn matches(self, criterion: &str) -> bool {
    self.as_str() == Some(criterion)
  }
}

/// Lifecycle state of the ticket itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TicketStatus {
  Open,
  InProgress,
  Solved,
  Closed,
  Pending,
  #[default]
  #[serde(other)]
  Unknown,
}

impl TicketStatus {
  pub fn as_str(self) -> Option<&'static str> {
    match self {
      Self::Open => Some("open"),
      Self::InProgress => Some("in-progress"),
      Self::Solved => Some("solved"),
      Self::Closed => Some("closed"),
      Self::Pending => Some("pending"),
      Self::Unknown => None,
    }
  }

  pub fn matches(self, criterion: &str) -> bool {
    self.as_str() == Some(criterion)
  }
}

// ─── Ticket ──────────────────────────────────────────────────────────────

/// One incident ticket as the backend reports it.
///
/// Timestamps stay as the ISO-8601 strings the backend emits; they are
/// displayed, never computed with, and the backend omits the UTC offset,
/// so parsing them into a concrete datetime type would be guesswork.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
  pub id:          String,
  pub title:       String,
  pub description: String,
  /// Raw report text from the monitoring source.
  pub report:      String,
  /// Remediation suggestions, when the pipeline produced any.
  pub suggestions: Option<Vec<String>>,
  #[serde(default)]
  pub severity:    Severity,
  #[serde(default)]
  pub category:    Category,
  /// The backend spells this field `insident_type`. Keep the wire name;
  /// correcting it here would break deserialization.
  #[serde(rename = "insident_type", default)]
  pub incident_type: IncidentType,
  #[serde(default)]
  pub environment: Environment,
  #[serde(default)]
  pub action_status: ActionStatus,
  #[serde(default)]
  pub status:      TicketStatus,
  pub reporter:    String,
  pub created_at:  String,
  pub resolution_time: Option<String>,
  #[serde(default)]
  pub email_sent:  bool,
  pub email_sent_at: Option<String>,
  pub action_taken: Option<String>,
  pub affected_services: Option<Vec<String>>,
  pub tags:        Option<Vec<String>>,
}
