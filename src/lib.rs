//! Publishing Profile Controller Library
//!
//! Core functionality for the Publishing Profile Controller: CRD types,
//! the external-resource lifecycle state machine, the Azure Resource Manager
//! client, and the reconciliation driver. Unit tests live in the module files
//! (e.g. `controller/publishing_profile/external.rs`).
//!
//! ## Quick Start
//!
//! ```rust
//! use publishing_profile_controller::prelude::*;
//! ```
//!
//! This brings commonly used types and traits into scope. For more specific
//! imports, use the individual modules.

pub mod constants;
pub mod controller;
pub mod crd;
pub mod credentials;
pub mod observability;
pub mod prelude;
pub mod provider;
pub mod runtime;
