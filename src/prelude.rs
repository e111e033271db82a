//! # Prelude
//!
//! Re-exports commonly used types and traits for convenience.
//!
//! ## Usage
//!
//! ```rust
//! use publishing_profile_controller::prelude::*;
//! ```
//!
//! This brings into scope:
//! - All CRD types (PublishingProfile, ProviderConfig, etc.)
//! - The external-resource interface (Connector, ExternalClient, ...)
//! - Reconciler types (Reconciler, ReconcilerError, ...)
//! - Provider traits and the Azure client

// CRD types - most commonly used
pub use crate::crd::*;

// External-resource interface - needed for implementing resource kinds
pub use crate::controller::external::{
    ConnectionDetails, Connector, ConnectorRegistry, Creation, ExternalClient, ExternalError,
    Observation, Update,
};

// PublishingProfile lifecycle - the resource-specific implementation
pub use crate::controller::publishing_profile::{
    ProfileState, ProviderConfigUsageTracker, PublishingProfileClient, PublishingProfileConnector,
    UsageTracker,
};

// Reconciler types - core controller functionality
pub use crate::controller::reconciler::{
    reconcile, BackoffState, ConnectionPublisher, Reconciler, ReconcilerError, SecretPublisher,
};

// Provider access - trait and Azure implementation
pub use crate::provider::azure::{AzureApiCredentials, ClientFactoryError, WebAppsClient};
pub use crate::provider::{
    ProviderApiError, PublishingProfileFormat, PublishingProfileOptions, SiteInfo, WebAppsApi,
};
