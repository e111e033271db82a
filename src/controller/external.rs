//! # External Resource Interface
//!
//! The capability interface between the resource-agnostic reconciliation
//! driver and resource-specific lifecycle logic. A resource kind implements
//! `Connector` (produce an authenticated `ExternalClient`) and the four
//! lifecycle operations; connectors are registered into a dispatch table
//! keyed by kind, so dispatch stays data-driven.
//!
//! Operations receive the desired record type-erased; each implementation
//! downcasts and treats a mismatch as a contract violation
//! (`ExternalError::ResourceKindMismatch`), never a silent skip.

use async_trait::async_trait;
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;

use crate::credentials::CredentialsError;
use crate::provider::azure::ClientFactoryError;
use crate::provider::ProviderApiError;

/// Connection details keyed by logical name, published as Secret data
pub type ConnectionDetails = BTreeMap<String, Vec<u8>>;

/// Errors from connecting to or operating on the external resource.
///
/// Nothing here is retried locally; the driver owns retry scheduling.
#[derive(Debug, Error)]
pub enum ExternalError {
    /// The type-erased record was not the expected resource kind.
    /// A wiring bug upstream, always an error.
    #[error("managed resource is not a {expected} custom resource")]
    ResourceKindMismatch { expected: &'static str },
    #[error("cannot track ProviderConfig usage: {0}")]
    TrackUsage(#[source] kube::Error),
    #[error("cannot get ProviderConfig {name}: {source}")]
    GetProviderConfig {
        name: String,
        #[source]
        source: kube::Error,
    },
    #[error("cannot get credentials: {0}")]
    Credentials(#[from] CredentialsError),
    #[error("cannot create web apps client: {0}")]
    NewClient(#[from] ClientFactoryError),
    /// Provider-side existence check failed; propagated verbatim, including
    /// not-found
    #[error(transparent)]
    Provider(#[from] ProviderApiError),
    #[error("error getting publishing profile: {0}")]
    FetchProfile(#[source] ProviderApiError),
    #[error("error reading publishing profile: {0}")]
    BodyRead(#[source] ProviderApiError),
    /// Persisted flags claim a virtual deletion without a fetched profile,
    /// an unreachable state under this controller
    #[error("status records a virtual deletion without a fetched profile")]
    RetiredWithoutFetch,
}

/// Result of observing the external resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observation {
    /// Whether the external resource exists (virtually retired objects read
    /// as gone)
    pub resource_exists: bool,
    /// Whether the external resource matches the desired state
    pub resource_up_to_date: bool,
    /// Connection details produced by this observation; non-empty only on
    /// the observation that performed the one-time fetch
    pub connection_details: ConnectionDetails,
}

/// Result of creating the external resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Creation {
    pub connection_details: ConnectionDetails,
}

/// Result of updating the external resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Update {
    pub connection_details: ConnectionDetails,
}

/// The four lifecycle operations of an external resource.
///
/// `status` is the working copy of the object's observed status; operations
/// mutate it and the driver persists it afterwards. Failure paths must leave
/// it untouched so retries stay idempotent.
#[async_trait]
pub trait ExternalClient: std::fmt::Debug + Send + Sync {
    async fn observe(
        &self,
        resource: &(dyn Any + Send + Sync),
        status: &mut (dyn Any + Send),
    ) -> Result<Observation, ExternalError>;

    async fn create(&self, resource: &(dyn Any + Send + Sync)) -> Result<Creation, ExternalError>;

    async fn update(&self, resource: &(dyn Any + Send + Sync)) -> Result<Update, ExternalError>;

    async fn delete(
        &self,
        resource: &(dyn Any + Send + Sync),
        status: &mut (dyn Any + Send),
    ) -> Result<(), ExternalError>;
}

/// Produces an `ExternalClient` bound to one authenticated session.
///
/// Connectors reconnect on every reconciliation; no pooling. This keeps
/// credential rotation a non-event relative to the provider round-trip.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        resource: &(dyn Any + Send + Sync),
    ) -> Result<Box<dyn ExternalClient>, ExternalError>;
}

/// Dispatch table mapping resource kinds to their connectors
#[derive(Default)]
pub struct ConnectorRegistry {
    connectors: HashMap<&'static str, Arc<dyn Connector>>,
}

impl std::fmt::Debug for ConnectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorRegistry")
            .field("kinds", &self.connectors.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ConnectorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the connector for a resource kind; the latest registration
    /// wins
    pub fn register(&mut self, kind: &'static str, connector: Arc<dyn Connector>) {
        self.connectors.insert(kind, connector);
    }

    /// Look up the connector for a kind
    #[must_use]
    pub fn connector_for(&self, kind: &str) -> Option<Arc<dyn Connector>> {
        self.connectors.get(kind).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopConnector;

    #[async_trait]
    impl Connector for NoopConnector {
        async fn connect(
            &self,
            _resource: &(dyn Any + Send + Sync),
        ) -> Result<Box<dyn ExternalClient>, ExternalError> {
            Err(ExternalError::ResourceKindMismatch { expected: "Noop" })
        }
    }

    #[test]
    fn test_registry_dispatches_by_kind() {
        let mut registry = ConnectorRegistry::new();
        registry.register("PublishingProfile", Arc::new(NoopConnector));

        assert!(registry.connector_for("PublishingProfile").is_some());
        assert!(registry.connector_for("SomethingElse").is_none());
    }

    #[test]
    fn test_observation_defaults_to_empty_details() {
        let observation = Observation::default();
        assert!(!observation.resource_exists);
        assert!(!observation.resource_up_to_date);
        assert!(observation.connection_details.is_empty());
    }
}
