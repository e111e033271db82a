//! # Reconciliation Driver
//!
//! The resource-agnostic loop: look up the connector for the object's kind,
//! connect, observe, then create/update/delete as the observation dictates,
//! publish connection artifacts, and persist status.
//!
//! Per-object invocations are serialized by kube-runtime; different objects
//! reconcile fully in parallel. The driver owns retry scheduling; nothing
//! below it retries.

mod publish;
mod status;
mod types;

pub use publish::{ConnectionPublisher, SecretPublisher};
pub use types::{BackoffState, Reconciler, ReconcilerError};

use kube::{
    api::{Api, Patch, PatchParams},
    Resource, ResourceExt,
};
use kube_runtime::controller::Action;
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::constants::{DEFAULT_POLL_INTERVAL_SECS, FINALIZER};
use crate::controller::external::Connector;
use crate::crd::{Condition, PublishingProfile};
use crate::observability::metrics;

/// Reconcile one PublishingProfile object
pub async fn reconcile(
    profile: Arc<PublishingProfile>,
    ctx: Arc<Reconciler>,
) -> Result<Action, ReconcilerError> {
    let name = profile.name_any();
    metrics::increment_reconciliations();
    let start = Instant::now();

    let result = reconcile_inner(&profile, &ctx).await;
    metrics::observe_reconciliation_duration(start.elapsed().as_secs_f64());

    if let Err(error) = &result {
        // Surface the wrapped error on the object; retry scheduling happens
        // in the error-policy layer
        status::mark_not_ready(&ctx.client, &name, &error.to_string()).await;
    }

    result
}

async fn reconcile_inner(
    profile: &Arc<PublishingProfile>,
    ctx: &Arc<Reconciler>,
) -> Result<Action, ReconcilerError> {
    let name = profile.name_any();
    let kind = PublishingProfile::kind(&());
    let connector = ctx
        .registry
        .connector_for(&kind)
        .ok_or_else(|| ReconcilerError::UnregisteredKind(kind.to_string()))?;

    if profile.meta().deletion_timestamp.is_some() {
        return finalize_deletion(profile, ctx, connector).await;
    }

    ensure_finalizer(ctx, profile).await?;

    let client = connector.connect(as_any(profile)).await?;
    let mut working_status = profile.status.clone().unwrap_or_default();

    let observation = client
        .observe(as_any(profile), &mut working_status)
        .await?;
    debug!(
        profile = %name,
        exists = observation.resource_exists,
        up_to_date = observation.resource_up_to_date,
        "Observed external resource"
    );

    if !observation.resource_exists {
        // Virtually retired or nothing provisioned; creation is a no-op for
        // this kind and returns no details
        let _creation = client.create(as_any(profile)).await?;
    } else if !observation.resource_up_to_date {
        let _update = client.update(as_any(profile)).await?;
    }

    // Publish before persisting: profile_gotten=true must never be stored
    // while the artifact is unpublished
    if !observation.connection_details.is_empty() {
        ctx.publisher
            .publish(profile, &observation.connection_details)
            .await
            .map_err(ReconcilerError::Publish)?;
    }

    working_status.observed_generation = profile.metadata.generation;
    working_status.last_reconcile_time = Some(chrono::Utc::now().to_rfc3339());
    working_status.set_condition(Condition::ready());
    status::patch_status(&ctx.client, &name, &working_status)
        .await
        .map_err(ReconcilerError::UpdateStatus)?;

    reset_backoff(ctx, &name);
    metrics::increment_requeues_total("timer-based");
    Ok(Action::requeue(Duration::from_secs(poll_interval_secs())))
}

async fn finalize_deletion(
    profile: &Arc<PublishingProfile>,
    ctx: &Arc<Reconciler>,
    connector: Arc<dyn Connector>,
) -> Result<Action, ReconcilerError> {
    let name = profile.name_any();
    if !profile.finalizers().iter().any(|f| f == FINALIZER) {
        return Ok(Action::await_change());
    }

    let mut working_status = profile.status.clone().unwrap_or_default();
    if working_status.profile_gotten && !working_status.deleted_virtually {
        // Something was fetched; retire it through the external client.
        // No provider call happens, but the contract stays uniform.
        let client = connector.connect(as_any(profile)).await?;
        client
            .delete(as_any(profile), &mut working_status)
            .await?;
        status::patch_status(&ctx.client, &name, &working_status)
            .await
            .map_err(ReconcilerError::UpdateStatus)?;
        info!(profile = %name, "Virtually deleted publishing profile");
    }

    remove_finalizer(ctx, profile).await?;
    Ok(Action::await_change())
}

async fn ensure_finalizer(
    ctx: &Arc<Reconciler>,
    profile: &Arc<PublishingProfile>,
) -> Result<(), ReconcilerError> {
    if profile.finalizers().iter().any(|f| f == FINALIZER) {
        return Ok(());
    }
    let mut finalizers = profile.finalizers().to_vec();
    finalizers.push(FINALIZER.to_string());
    patch_finalizers(ctx, &profile.name_any(), finalizers).await
}

async fn remove_finalizer(
    ctx: &Arc<Reconciler>,
    profile: &Arc<PublishingProfile>,
) -> Result<(), ReconcilerError> {
    let finalizers: Vec<String> = profile
        .finalizers()
        .iter()
        .filter(|f| *f != FINALIZER)
        .cloned()
        .collect();
    patch_finalizers(ctx, &profile.name_any(), finalizers).await
}

async fn patch_finalizers(
    ctx: &Arc<Reconciler>,
    name: &str,
    finalizers: Vec<String>,
) -> Result<(), ReconcilerError> {
    let api: Api<PublishingProfile> = Api::all(ctx.client.clone());
    api.patch(
        name,
        &PatchParams::default(),
        &Patch::Merge(json!({ "metadata": { "finalizers": finalizers } })),
    )
    .await
    .map_err(ReconcilerError::Finalizers)?;
    Ok(())
}

fn reset_backoff(ctx: &Arc<Reconciler>, name: &str) {
    if let Ok(mut states) = ctx.backoff_states.lock() {
        if let Some(state) = states.get_mut(name) {
            if state.error_count > 0 {
                debug!(profile = name, "Resetting error backoff after success");
            }
            state.reset();
        }
    }
}

fn poll_interval_secs() -> u64 {
    std::env::var("POLL_INTERVAL_SECS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
}

fn as_any(profile: &Arc<PublishingProfile>) -> &(dyn Any + Send + Sync) {
    profile.as_ref()
}
