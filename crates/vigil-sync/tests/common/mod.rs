//! Shared test support: a queue-driven in-process stub of the ticket API.

#![allow(dead_code)]

use std::{collections::VecDeque, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
  Router,
  body::Body,
  extract::State,
  http::{Request, Response, StatusCode},
  routing::any,
};
use serde_json::json;
use tokio::{net::TcpListener, sync::Mutex};
use vigil_core::{
  Ticket,
  ticket::{
    ActionStatus, Category, Environment, IncidentType, Severity, TicketStatus,
  },
};

// ─── Canned responses ────────────────────────────────────────────────────

/// A captured request, for asserting on paths and query strings.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
  pub path:  String,
  pub query: Option<String>,
}

/// A canned response. Responses are served strictly in enqueue order, one
/// per request, regardless of path; an empty queue serves an empty
/// collection.
#[derive(Debug, Clone)]
pub struct MockResponse {
  pub status: u16,
  pub body:   String,
  pub delay:  Duration,
}

impl Default for MockResponse {
  fn default() -> Self {
    Self {
      status: 200,
      body:   json!({ "success": true, "data": [] }).to_string(),
      delay:  Duration::ZERO,
    }
  }
}

impl MockResponse {
  /// A successful envelope carrying `tickets` as its data.
  pub fn tickets(tickets: &[Ticket]) -> Self {
    Self {
      body: json!({ "success": true, "data": tickets }).to_string(),
      ..Self::default()
    }
  }

  /// A successful envelope carrying a single ticket.
  pub fn one_ticket(ticket: &Ticket) -> Self {
    Self {
      body: json!({ "success": true, "data": ticket }).to_string(),
      ..Self::default()
    }
  }

  /// A successful envelope with no `data` field at all.
  pub fn no_data() -> Self {
    Self {
      body: json!({ "success": true }).to_string(),
      ..Self::default()
    }
  }

  /// An error envelope with the given HTTP status.
  pub fn error(status: u16, message: &str) -> Self {
    Self {
      status,
      body: json!({ "success": false, "error": message }).to_string(),
      ..Self::default()
    }
  }

  /// A body that is not JSON at all.
  pub fn garbage() -> Self {
    Self {
      body: "definitely not json".into(),
      ..Self::default()
    }
  }

  /// Hold the response back for `delay` before answering.
  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = delay;
    self
  }
}

// ─── Mock server ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct MockState {
  requests:  Arc<Mutex<Vec<CapturedRequest>>>,
  responses: Arc<Mutex<VecDeque<MockResponse>>>,
}

/// An in-process ticket API stub on an ephemeral port.
pub struct MockApi {
  pub addr: SocketAddr,
  state:    MockState,
  shutdown: tokio::sync::watch::Sender<bool>,
}

impl MockApi {
  pub async fn start() -> Self {
    let state = MockState {
      requests:  Arc::new(Mutex::new(Vec::new())),
      responses: Arc::new(Mutex::new(VecDeque::new())),
    };
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);

    let app = Router::new()
      .route("/{*path}", any(handle))
      .with_state(state.clone());
    let listener = TcpListener::bind("127.0.0.1:0")
      .await
      .expect("binding mock listener");
    let addr = listener.local_addr().expect("mock listener addr");

    tokio::spawn(async move {
      axum::serve(listener, app)
        .with_graceful_shutdown(async move {
          let _ = shutdown_rx.changed().await;
        })
        .await
        .ok();
    });

    Self {
      addr,
      state,
      shutdown: shutdown_tx,
    }
  }

  pub fn base_url(&self) -> String {
    format!("http://{}", self.addr)
  }

  /// Queue the response for the next unanswered request.
  pub async fn enqueue(&self, response: MockResponse) {
    self.state.responses.lock().await.push_back(response);
  }

  pub async fn requests(&self) -> Vec<CapturedRequest> {
    self.state.requests.lock().await.clone()
  }

  /// Poll until `n` requests have arrived. Panics after two seconds so a
  /// stuck test fails with a message instead of hanging.
  pub async fn wait_for_requests(&self, n: usize) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
      if self.state.requests.lock().await.len() >= n {
        return;
      }
      if tokio::time::Instant::now() > deadline {
        panic!("mock api never saw {n} requests");
      }
      tokio::time::sleep(Duration::from_millis(5)).await;
    }
  }
}

impl Drop for MockApi {
  fn drop(&mut self) {
    let _ = self.shutdown.send(true);
  }
}

async fn handle(
  State(state): State<MockState>,
  req: Request<Body>,
) -> Response<Body> {
  state.requests.lock().await.push(CapturedRequest {
    path:  req.uri().path().to_string(),
    query: req.uri().query().map(str::to_string),
  });

  let response = state.responses.lock().await.pop_front().unwrap_or_default();
  if !response.delay.is_zero() {
    tokio::time::sleep(response.delay).await;
  }

  Response::builder()
    .status(StatusCode::from_u16(response.status).expect("mock status"))
    .header("content-type", "application/json")
    .body(Body::from(response.body))
    .expect("mock response")
}

// ─── Fixtures ────────────────────────────────────────────────────────────

/// A plausible ticket with the given id; everything else is fixed.
pub fn ticket(id: &str) -> Ticket {
  Ticket {
    id:                id.into(),
    title:             format!("ticket {id}"),
    description:       "something fell over".into(),
    report:            "raw alert text".into(),
    suggestions:       None,
    severity:          Severity::Medium,
    category:          Category::Other,
    incident_type:     IncidentType::Other,
    environment:       Environment::Production,
    action_status:     ActionStatus::Pending,
    status:            TicketStatus::Open,
    reporter:          "monitor".into(),
    created_at:        "2024-03-01T10:00:00".into(),
    resolution_time:   None,
    email_sent:        false,
    email_sent_at:     None,
    action_taken:      None,
    affected_services: None,
    tags:              None,
  }
}

pub fn with_severity(id: &str, severity: Severity) -> Ticket {
  Ticket {
    severity,
    ..ticket(id)
  }
}
