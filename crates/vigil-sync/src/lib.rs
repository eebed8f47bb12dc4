//! Realtime synchronization engine for the vigil incident dashboard.
//!
//! [`SyncEngine`] owns a background task that fetches the ticket
//! collection, refreshes it on an interval once the first load succeeds,
//! and publishes a coherent [`DashboardSnapshot`] over a watch channel
//! after every change. [`DashboardHandle`] is the cheap-to-clone surface
//! a front end drives: manual refresh, filter edits, selection.
//!
//! The ordering hazard this crate exists to contain: fetch attempts
//! overlap, and a slow stale response must never clobber a newer one.
//! See [`engine`] for how attempt generations make that impossible.

pub mod client;
pub mod engine;
pub mod error;
pub mod snapshot;

pub use client::{ApiClient, ApiConfig, TicketQuery};
pub use engine::{DashboardHandle, SyncEngine, SyncOptions};
pub use error::{FetchError, Result};
pub use snapshot::DashboardSnapshot;
