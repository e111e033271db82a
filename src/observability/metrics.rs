//! # Metrics
//!
//! Prometheus metrics for monitoring the controller.
//!
//! ## Metrics Exposed
//!
//! - `publishing_profile_reconciliations_total` - Total number of reconciliations
//! - `publishing_profile_reconciliation_errors_total` - Total number of reconciliation errors
//! - `publishing_profile_reconciliation_duration_seconds` - Duration of reconciliation operations
//! - `publishing_profile_fetches_total` - Total number of one-time profile fetches performed
//! - `publishing_profile_connection_secrets_published_total` - Connection secrets written
//! - `publishing_profile_requeues_total` - Requeues by trigger source
//! - `publishing_profile_azure_api_operations_total` - ARM operations by type
//! - `publishing_profile_azure_api_operation_duration_seconds` - ARM operation durations
//! - `publishing_profile_azure_api_errors_total` - ARM errors by operation

use anyhow::Result;
use prometheus::{Histogram, HistogramVec, IntCounter, IntCounterVec, Registry};
use std::sync::LazyLock;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static RECONCILIATIONS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "publishing_profile_reconciliations_total",
        "Total number of reconciliations",
    )
    .expect("Failed to create RECONCILIATIONS_TOTAL metric - this should never happen")
});

static RECONCILIATION_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "publishing_profile_reconciliation_errors_total",
        "Total number of reconciliation errors",
    )
    .expect("Failed to create RECONCILIATION_ERRORS_TOTAL metric - this should never happen")
});

static RECONCILIATION_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "publishing_profile_reconciliation_duration_seconds",
            "Duration of reconciliation in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
    )
    .expect("Failed to create RECONCILIATION_DURATION metric - this should never happen")
});

static PROFILE_FETCHES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "publishing_profile_fetches_total",
        "Total number of one-time publishing-profile fetches performed",
    )
    .expect("Failed to create PROFILE_FETCHES_TOTAL metric - this should never happen")
});

static CONNECTION_SECRETS_PUBLISHED_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "publishing_profile_connection_secrets_published_total",
        "Total number of connection secrets published",
    )
    .expect(
        "Failed to create CONNECTION_SECRETS_PUBLISHED_TOTAL metric - this should never happen",
    )
});

static REQUEUES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "publishing_profile_requeues_total",
            "Total number of requeues by trigger source",
        ),
        &["trigger"],
    )
    .expect("Failed to create REQUEUES_TOTAL metric - this should never happen")
});

static AZURE_API_OPERATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "publishing_profile_azure_api_operations_total",
            "Total number of Azure Resource Manager operations",
        ),
        &["operation"],
    )
    .expect("Failed to create AZURE_API_OPERATIONS_TOTAL metric - this should never happen")
});

static AZURE_API_OPERATION_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        prometheus::HistogramOpts::new(
            "publishing_profile_azure_api_operation_duration_seconds",
            "Duration of Azure Resource Manager operations in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0]),
        &["operation"],
    )
    .expect("Failed to create AZURE_API_OPERATION_DURATION metric - this should never happen")
});

static AZURE_API_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "publishing_profile_azure_api_errors_total",
            "Total number of Azure Resource Manager errors",
        ),
        &["operation"],
    )
    .expect("Failed to create AZURE_API_ERRORS_TOTAL metric - this should never happen")
});

/// Register all metrics with the process registry.
///
/// Idempotent registration is not needed; this runs once at startup.
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(RECONCILIATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(RECONCILIATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(PROFILE_FETCHES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(CONNECTION_SECRETS_PUBLISHED_TOTAL.clone()))?;
    REGISTRY.register(Box::new(REQUEUES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(AZURE_API_OPERATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(AZURE_API_OPERATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(AZURE_API_ERRORS_TOTAL.clone()))?;
    Ok(())
}

pub fn increment_reconciliations() {
    RECONCILIATIONS_TOTAL.inc();
}

pub fn increment_reconciliation_errors() {
    RECONCILIATION_ERRORS_TOTAL.inc();
}

pub fn observe_reconciliation_duration(seconds: f64) {
    RECONCILIATION_DURATION.observe(seconds);
}

pub fn increment_profile_fetches() {
    PROFILE_FETCHES_TOTAL.inc();
}

pub fn increment_connection_secrets_published() {
    CONNECTION_SECRETS_PUBLISHED_TOTAL.inc();
}

pub fn increment_requeues_total(trigger: &str) {
    REQUEUES_TOTAL.with_label_values(&[trigger]).inc();
}

pub fn record_azure_api_operation(operation: &str, seconds: f64) {
    AZURE_API_OPERATIONS_TOTAL
        .with_label_values(&[operation])
        .inc();
    AZURE_API_OPERATION_DURATION
        .with_label_values(&[operation])
        .observe(seconds);
}

pub fn increment_azure_api_errors(operation: &str) {
    AZURE_API_ERRORS_TOTAL.with_label_values(&[operation]).inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_increment_without_registration() {
        let before = RECONCILIATIONS_TOTAL.get();
        increment_reconciliations();
        assert_eq!(RECONCILIATIONS_TOTAL.get(), before + 1);

        let before = AZURE_API_ERRORS_TOTAL.with_label_values(&["get_site"]).get();
        increment_azure_api_errors("get_site");
        assert_eq!(
            AZURE_API_ERRORS_TOTAL.with_label_values(&["get_site"]).get(),
            before + 1
        );
    }
}
