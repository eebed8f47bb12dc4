//! Core types and pure logic for the vigil incident dashboard.
//!
//! Everything here is synchronous and side-effect free: the ticket model
//! as the backend serves it, the client-side filter pipeline that derives
//! the visible subset, and the headline counts. The sync engine and any
//! front end build on this crate; it depends on nothing heavier than
//! serde.

pub mod filter;
pub mod stats;
pub mod ticket;

pub use filter::{FilterCriteria, FilterField};
pub use stats::TicketStats;
pub use ticket::Ticket;
