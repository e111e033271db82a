//! # PublishingProfile Connector
//!
//! Produces an authenticated external client for a PublishingProfile:
//! 1. Track that the object consumes its referenced ProviderConfig
//! 2. Resolve the ProviderConfig
//! 3. Extract raw credential bytes from the configured source
//! 4. Build the Web Apps client from the credential document

use async_trait::async_trait;
use kube::{
    api::{Api, Patch, PatchParams},
    Client, Resource, ResourceExt,
};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use tracing::debug;

use crate::constants::FIELD_MANAGER;
use crate::controller::external::{Connector, ExternalClient, ExternalError};
use crate::credentials;
use crate::crd::{ProviderConfig, ProviderConfigUsage, PublishingProfile};
use crate::provider::azure::WebAppsClient;
use crate::provider::WebAppsApi;

use super::{profile_of, PublishingProfileClient};

/// Records that a resource is consuming a ProviderConfig
#[async_trait]
pub trait UsageTracker: Send + Sync {
    async fn track(&self, profile: &PublishingProfile) -> Result<(), kube::Error>;
}

/// Tracks usage by applying one ProviderConfigUsage object per consumer
#[derive(Clone)]
pub struct ProviderConfigUsageTracker {
    client: Client,
}

impl std::fmt::Debug for ProviderConfigUsageTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfigUsageTracker")
            .finish_non_exhaustive()
    }
}

impl ProviderConfigUsageTracker {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UsageTracker for ProviderConfigUsageTracker {
    async fn track(&self, profile: &PublishingProfile) -> Result<(), kube::Error> {
        let name = profile.name_any();
        let usage = json!({
            "apiVersion": "appservice.octopilot.io/v1alpha1",
            "kind": "ProviderConfigUsage",
            "metadata": { "name": name },
            "spec": {
                "providerConfigName": profile.spec.provider_config_ref.name,
                "resourceKind": PublishingProfile::kind(&()),
                "resourceName": name,
            },
        });

        let usages: Api<ProviderConfigUsage> = Api::all(self.client.clone());
        usages
            .patch(
                &name,
                &PatchParams::apply(FIELD_MANAGER).force(),
                &Patch::Apply(&usage),
            )
            .await?;
        debug!(
            provider_config = %profile.spec.provider_config_ref.name,
            resource = %name,
            "Tracked ProviderConfig usage"
        );
        Ok(())
    }
}

/// Connector for PublishingProfile objects.
///
/// Reconnects on every reconciliation; nothing is cached between calls, so
/// rotated credentials take effect on the next cycle.
pub struct PublishingProfileConnector {
    client: Client,
    usage: Arc<dyn UsageTracker>,
    factory: fn(&[u8]) -> Result<WebAppsClient, crate::provider::azure::ClientFactoryError>,
}

impl std::fmt::Debug for PublishingProfileConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishingProfileConnector").finish_non_exhaustive()
    }
}

impl PublishingProfileConnector {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            usage: Arc::new(ProviderConfigUsageTracker::new(client.clone())),
            client,
            factory: WebAppsClient::from_credential_bytes,
        }
    }

    /// Swap the usage tracker (tests)
    #[must_use]
    pub fn with_usage_tracker(mut self, usage: Arc<dyn UsageTracker>) -> Self {
        self.usage = usage;
        self
    }
}

#[async_trait]
impl Connector for PublishingProfileConnector {
    async fn connect(
        &self,
        resource: &(dyn Any + Send + Sync),
    ) -> Result<Box<dyn ExternalClient>, ExternalError> {
        let profile = profile_of(resource)?;

        self.usage
            .track(profile)
            .await
            .map_err(ExternalError::TrackUsage)?;

        let config_name = &profile.spec.provider_config_ref.name;
        let configs: Api<ProviderConfig> = Api::all(self.client.clone());
        let provider_config =
            configs
                .get(config_name)
                .await
                .map_err(|source| ExternalError::GetProviderConfig {
                    name: config_name.clone(),
                    source,
                })?;

        let credential_bytes =
            credentials::extract(&self.client, &provider_config.spec.credentials).await?;

        let web_apps = (self.factory)(credential_bytes.as_slice())?;

        Ok(Box::new(PublishingProfileClient::new(
            Arc::new(web_apps) as Arc<dyn WebAppsApi>
        )))
    }
}
