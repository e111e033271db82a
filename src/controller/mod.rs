//! # Controller
//!
//! Reconciliation machinery: the resource-agnostic capability interface,
//! the PublishingProfile connector and lifecycle state machine, the driver,
//! error backoff, and the probes/metrics server.

pub mod backoff;
pub mod external;
pub mod publishing_profile;
pub mod reconciler;
pub mod server;
