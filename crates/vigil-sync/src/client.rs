//! Async HTTP client for the ticket API.
//!
//! Every payload-bearing endpoint wraps its data in the same JSON
//! envelope; the client unwraps it and treats an absent `data` field as
//! an empty payload, which is how the backend spells "no matches".

use std::time::Duration;

use serde::Deserialize;
use vigil_core::Ticket;

use crate::error::{FetchError, Result};

/// Connection settings for the ticket API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// Scheme, host, and optional port, e.g. `http://localhost:8080`.
  /// Ticket routes live under `/api`; the health probe does not.
  pub base_url: String,
}

/// Async HTTP client for the ticket JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based, and the
/// sync engine clones one per fetch attempt.
#[derive(Debug, Clone)]
pub struct ApiClient {
  client: reqwest::Client,
  config: ApiConfig,
}

/// Server-side filter parameters for [`ApiClient::fetch_filtered`].
/// Empty fields are left out of the query string entirely.
#[derive(Debug, Clone, Default)]
pub struct TicketQuery {
  pub severity:      String,
  pub category:      String,
  pub environment:   String,
  pub status:        String,
  pub action_status: String,
  pub incident_type: String,
  pub search:        String,
}

impl TicketQuery {
  fn params(&self) -> Vec<(&'static str, &str)> {
    let mut params = Vec::new();
    if !self.severity.is_empty() {
      params.push(("severity", self.severity.as_str()));
    }
    if !self.category.is_empty() {
      params.push(("category", self.category.as_str()));
    }
    if !self.environment.is_empty() {
      params.push(("environment", self.environment.as_str()));
    }
    if !self.status.is_empty() {
      params.push(("status", self.status.as_str()));
    }
    if !self.action_status.is_empty() {
      params.push(("actionStatus", self.action_status.as_str()));
    }
    if !self.incident_type.is_empty() {
      params.push(("incidentType", self.incident_type.as_str()));
    }
    if !self.search.is_empty() {
      params.push(("search", self.search.as_str()));
    }
    params
  }
}

/// The envelope every backend response wraps its payload in. `success`,
/// `message`, and `error` also exist on the wire but carry nothing the
/// client acts on; failures are detected from the HTTP status instead.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
  data: Option<T>,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  // ── Collections ────────────────────────────────────────────────────────

  /// `GET /api/tickets`: the full collection, newest first as the
  /// backend orders it.
  pub async fn fetch_all(&self) -> Result<Vec<Ticket>> {
    let resp = self.client.get(self.url("/tickets")).send().await?;

    if !resp.status().is_success() {
      return Err(FetchError::Status(resp.status()));
    }
    let envelope: Envelope<Vec<Ticket>> = resp.json().await?;
    Ok(envelope.data.unwrap_or_default())
  }

  /// `GET /api/tickets/status/{status}`
  pub async fn fetch_by_status(&self, status: &str) -> Result<Vec<Ticket>> {
    let url = self.url(&format!("/tickets/status/{status}"));
    let resp = self.client.get(url).send().await?;

    if !resp.status().is_success() {
      return Err(FetchError::Status(resp.status()));
    }
    let envelope: Envelope<Vec<Ticket>> = resp.json().await?;
    Ok(envelope.data.unwrap_or_default())
  }

  /// `GET /api/tickets/severity/{severity}`
  pub async fn fetch_by_severity(
    &self,
    severity: &str,
  ) -> Result<Vec<Ticket>> {
    let url = self.url(&format!("/tickets/severity/{severity}"));
    let resp = self.client.get(url).send().await?;

    if !resp.status().is_success() {
      return Err(FetchError::Status(resp.status()));
    }
    let envelope: Envelope<Vec<Ticket>> = resp.json().await?;
    Ok(envelope.data.unwrap_or_default())
  }

  /// `GET /api/tickets/incident-type/{incident_type}`
  pub async fn fetch_by_incident_type(
    &self,
    incident_type: &str,
  ) -> Result<Vec<Ticket>> {
    let url = self.url(&format!("/tickets/incident-type/{incident_type}"));
    let resp = self.client.get(url).send().await?;

    if !resp.status().is_success() {
      return Err(FetchError::Status(resp.status()));
    }
    let envelope: Envelope<Vec<Ticket>> = resp.json().await?;
    Ok(envelope.data.unwrap_or_default())
  }

  /// `GET /api/tickets/search?q=<term>`
  pub async fn search(&self, term: &str) -> Result<Vec<Ticket>> {
    let resp = self
      .client
      .get(self.url("/tickets/search"))
      .query(&[("q", term)])
      .send()
      .await?;

    if !resp.status().is_success() {
      return Err(FetchError::Status(resp.status()));
    }
    let envelope: Envelope<Vec<Ticket>> = resp.json().await?;
    Ok(envelope.data.unwrap_or_default())
  }

  /// `GET /api/tickets/filter?severity=…&category=…`, the server-side
  /// counterpart of the local filter pipeline.
  pub async fn fetch_filtered(
    &self,
    query: &TicketQuery,
  ) -> Result<Vec<Ticket>> {
    let resp = self
      .client
      .get(self.url("/tickets/filter"))
      .query(&query.params())
      .send()
      .await?;

    if !resp.status().is_success() {
      return Err(FetchError::Status(resp.status()));
    }
    let envelope: Envelope<Vec<Ticket>> = resp.json().await?;
    Ok(envelope.data.unwrap_or_default())
  }

  // ── Single tickets ─────────────────────────────────────────────────────

  /// `GET /api/tickets/{id}`, with `Ok(None)` when the backend has no ticket
  /// with that id.
  pub async fn fetch_by_id(&self, id: &str) -> Result<Option<Ticket>> {
    let url = self.url(&format!("/tickets/{id}"));
    let resp = self.client.get(url).send().await?;

    if resp.status() == reqwest::StatusCode::NOT_FOUND {
      return Ok(None);
    }
    if !resp.status().is_success() {
      return Err(FetchError::Status(resp.status()));
    }
    let envelope: Envelope<Ticket> = resp.json().await?;
    Ok(envelope.data)
  }

  // ── Liveness ───────────────────────────────────────────────────────────

  /// `GET /health`, which sits beside the `/api` prefix, not under it.
  /// An unreachable backend reads as unhealthy rather than as an error.
  pub async fn health(&self) -> bool {
    let url =
      format!("{}/health", self.config.base_url.trim_end_matches('/'));
    match self.client.get(url).send().await {
      Ok(resp) => resp.status().is_success(),
      Err(_) => false,
    }
  }
}
