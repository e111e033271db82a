//! # Types
//!
//! Core types for the reconciliation driver.

use kube::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::constants::{ERROR_BACKOFF_MAX_MINUTES, ERROR_BACKOFF_MIN_MINUTES};
use crate::controller::backoff::FibonacciBackoff;
use crate::controller::external::{ConnectorRegistry, ExternalError};
use crate::controller::publishing_profile::PublishingProfileConnector;
use crate::controller::reconciler::publish::{ConnectionPublisher, SecretPublisher};

/// Driver-level reconciliation errors
#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error("no connector registered for kind {0}")]
    UnregisteredKind(String),
    #[error(transparent)]
    External(#[from] ExternalError),
    #[error("cannot publish connection details: {0}")]
    Publish(#[source] kube::Error),
    #[error("cannot update status: {0}")]
    UpdateStatus(#[source] kube::Error),
    #[error("cannot update finalizers: {0}")]
    Finalizers(#[source] kube::Error),
}

/// Backoff state for a specific resource
/// Tracks error count and backoff calculator for progressive retries
#[derive(Debug, Clone)]
pub struct BackoffState {
    pub backoff: FibonacciBackoff,
    pub error_count: u32,
}

impl BackoffState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            backoff: FibonacciBackoff::new(ERROR_BACKOFF_MIN_MINUTES, ERROR_BACKOFF_MAX_MINUTES),
            error_count: 0,
        }
    }

    pub fn increment_error(&mut self) {
        self.error_count += 1;
    }

    pub fn reset(&mut self) {
        self.error_count = 0;
        self.backoff.reset();
    }
}

impl Default for BackoffState {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared reconciler context.
///
/// The external client is created per reconciliation; the context only
/// carries the dispatch table and collaborators. Backoff state lives here so
/// the error-policy layer can compute per-resource retry delays without
/// blocking watch paths.
#[derive(Clone)]
pub struct Reconciler {
    pub client: Client,
    pub registry: Arc<ConnectorRegistry>,
    pub publisher: Arc<dyn ConnectionPublisher>,
    pub backoff_states: Arc<Mutex<HashMap<String, BackoffState>>>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Build the context with the PublishingProfile connector registered
    #[must_use]
    pub fn new(client: Client) -> Self {
        let mut registry = ConnectorRegistry::new();
        registry.register(
            "PublishingProfile",
            Arc::new(PublishingProfileConnector::new(client.clone())),
        );

        Self {
            registry: Arc::new(registry),
            publisher: Arc::new(SecretPublisher::new(client.clone())),
            client,
            backoff_states: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}
