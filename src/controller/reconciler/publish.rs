//! # Connection Publisher
//!
//! Persists connection details as an Opaque Secret, once, at the moment the
//! profile document is fetched.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::{
    api::{Api, Patch, PatchParams},
    Client, ResourceExt,
};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::constants::FIELD_MANAGER;
use crate::controller::external::ConnectionDetails;
use crate::crd::PublishingProfile;
use crate::observability::metrics;

/// Accepts connection details for persistence
#[async_trait]
pub trait ConnectionPublisher: Send + Sync {
    async fn publish(
        &self,
        profile: &PublishingProfile,
        details: &ConnectionDetails,
    ) -> Result<(), kube::Error>;
}

/// Publishes connection details to the Secret named by
/// `writeConnectionSecretToRef`
#[derive(Clone)]
pub struct SecretPublisher {
    client: Client,
}

impl std::fmt::Debug for SecretPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretPublisher").finish_non_exhaustive()
    }
}

impl SecretPublisher {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ConnectionPublisher for SecretPublisher {
    async fn publish(
        &self,
        profile: &PublishingProfile,
        details: &ConnectionDetails,
    ) -> Result<(), kube::Error> {
        let Some(secret_ref) = profile.spec.write_connection_secret_to_ref.as_ref() else {
            warn!(
                profile = %profile.name_any(),
                "No writeConnectionSecretToRef configured, discarding fetched profile document"
            );
            return Ok(());
        };

        let payload = json!({
            "apiVersion": "v1",
            "kind": "Secret",
            "metadata": {
                "name": secret_ref.name,
                "namespace": secret_ref.namespace,
            },
            "type": "Opaque",
            "data": secret_payload(details),
        });

        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), &secret_ref.namespace);
        secrets
            .patch(
                &secret_ref.name,
                &PatchParams::apply(FIELD_MANAGER).force(),
                &Patch::Apply(&payload),
            )
            .await?;

        metrics::increment_connection_secrets_published();
        info!(
            secret = %format!("{}/{}", secret_ref.namespace, secret_ref.name),
            keys = details.len(),
            "Published connection details"
        );
        Ok(())
    }
}

/// Secret data map; ByteString serializes as base64 on the wire
fn secret_payload(details: &ConnectionDetails) -> BTreeMap<String, ByteString> {
    details
        .iter()
        .map(|(key, value)| (key.clone(), ByteString(value.clone())))
        .collect()
}
