//! # Error Policy
//!
//! Error handling and backoff for the controller watch loop.
//!
//! Backoff state is tracked per resource so many failing objects cannot
//! interfere with each other's retry schedules, and lives in this layer
//! rather than the reconciler to keep watch/timer paths unblocked.

use kube_runtime::controller::Action;
use kube::ResourceExt;
use std::sync::Arc;
use tracing::{error, info};

use crate::constants::DEFAULT_RECONCILIATION_ERROR_REQUEUE_SECS;
use crate::controller::reconciler::{BackoffState, Reconciler, ReconcilerError};
use crate::crd::PublishingProfile;
use crate::observability::metrics;

/// Handle reconciliation errors with per-resource Fibonacci backoff
pub fn handle_reconciliation_error(
    profile: Arc<PublishingProfile>,
    error: &ReconcilerError,
    ctx: Arc<Reconciler>,
) -> Action {
    let name = profile.name_any();

    error!("Reconciliation error for {}: {:?}", name, error);
    metrics::increment_reconciliation_errors();

    let (backoff_seconds, error_count) = match ctx.backoff_states.lock() {
        Ok(mut states) => {
            let state = states.entry(name.clone()).or_insert_with(BackoffState::new);
            state.increment_error();
            (state.backoff.next_backoff_seconds(), state.error_count)
        }
        Err(poisoned) => {
            error!("Backoff state lock poisoned: {poisoned}, using default requeue");
            (DEFAULT_RECONCILIATION_ERROR_REQUEUE_SECS, 0)
        }
    };

    info!(
        "Retrying {} in {}s (error count: {}, trigger source: error-backoff)",
        name, backoff_seconds, error_count
    );

    metrics::increment_requeues_total("error-backoff");
    Action::requeue(std::time::Duration::from_secs(backoff_seconds))
}
