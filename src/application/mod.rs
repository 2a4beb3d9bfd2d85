//! Application layer - orchestration of domain logic.
//!
//! This layer coordinates the admission pipeline:
//! - Quota gate (the admission decision)
//! - Admission metrics (observability counters)
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the application layer independent
//! from infrastructure details.

pub mod gate;
pub mod metrics;
pub mod ports;
