//! # Status Persistence
//!
//! Patches the PublishingProfile status subresource and surfaces failures
//! as a non-ready condition.

use kube::{
    api::{Api, Patch, PatchParams},
    Client,
};
use serde_json::json;
use tracing::warn;

use crate::crd::{Condition, PublishingProfile, PublishingProfileStatus};

/// Persist the working status copy via a merge patch on the status
/// subresource
pub async fn patch_status(
    client: &Client,
    name: &str,
    status: &PublishingProfileStatus,
) -> Result<(), kube::Error> {
    let api: Api<PublishingProfile> = Api::all(client.clone());
    api.patch_status(
        name,
        &PatchParams::default(),
        &Patch::Merge(json!({ "status": status })),
    )
    .await?;
    Ok(())
}

/// Best-effort: surface a reconciliation failure as `Ready=False` with the
/// wrapped error message. Never fails the caller; the original error is
/// what the driver retries on.
pub async fn mark_not_ready(client: &Client, name: &str, message: &str) {
    let api: Api<PublishingProfile> = Api::all(client.clone());
    let current = match api.get_status(name).await {
        Ok(profile) => profile.status.unwrap_or_default(),
        Err(error) => {
            warn!(profile = name, "Cannot read status to mark not-ready: {error}");
            return;
        }
    };

    let mut status = current;
    status.set_condition(Condition::not_ready(message));

    if let Err(error) = patch_status(client, name, &status).await {
        warn!(profile = name, "Cannot mark not-ready: {error}");
    }
}
