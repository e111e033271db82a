//! # PublishingProfile Lifecycle
//!
//! Resource-specific implementation of the external-resource interface for
//! PublishingProfile objects: the connector (credential wiring) and the
//! fetch-once lifecycle state machine.

mod connector;
mod external;

pub use connector::{ProviderConfigUsageTracker, PublishingProfileConnector, UsageTracker};
pub use external::{ProfileState, PublishingProfileClient};

use std::any::Any;

use crate::controller::external::ExternalError;
use crate::crd::{PublishingProfile, PublishingProfileStatus};

/// Downcast the type-erased desired record; a mismatch is a wiring bug
pub(crate) fn profile_of(
    resource: &(dyn Any + Send + Sync),
) -> Result<&PublishingProfile, ExternalError> {
    resource
        .downcast_ref::<PublishingProfile>()
        .ok_or(ExternalError::ResourceKindMismatch {
            expected: "PublishingProfile",
        })
}

/// Downcast the type-erased working status
pub(crate) fn status_of(
    status: &mut (dyn Any + Send),
) -> Result<&mut PublishingProfileStatus, ExternalError> {
    status
        .downcast_mut::<PublishingProfileStatus>()
        .ok_or(ExternalError::ResourceKindMismatch {
            expected: "PublishingProfile",
        })
}
