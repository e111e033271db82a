//! # Custom Resource Definitions
//!
//! CRD types for the Publishing Profile Controller.
//!
//! ## Module Structure
//!
//! - `publishing_profile.rs` - The PublishingProfile resource (desired state)
//! - `provider_config.rs` - ProviderConfig and ProviderConfigUsage resources
//! - `status.rs` - Status and condition types (observed state)

mod provider_config;
mod publishing_profile;
mod status;

// Re-export all public types
pub use provider_config::{
    CredentialSource, ProviderConfig, ProviderConfigSpec, ProviderConfigUsage,
    ProviderConfigUsageSpec, SecretKeySelector,
};
pub use publishing_profile::{
    ConnectionSecretReference, ProviderConfigReference, PublishingProfile, PublishingProfileSpec,
    ResourceReference, ResourceSelector,
};
pub use status::{
    Condition, PublishingProfileStatus, CONDITION_TYPE_AVAILABLE, CONDITION_TYPE_READY,
};
