//! # ProviderConfig
//!
//! Cluster-scoped Azure credential configuration and its usage-tracking
//! companion object.

use serde::{Deserialize, Serialize};

/// ProviderConfig Custom Resource Definition
///
/// Points the controller at a source of Azure credentials. Referenced by
/// PublishingProfile objects via `providerConfigRef`; every object consuming
/// a ProviderConfig is recorded as a ProviderConfigUsage so the config is
/// visibly in use.
///
/// # Example
///
/// ```yaml
/// apiVersion: appservice.octopilot.io/v1alpha1
/// kind: ProviderConfig
/// metadata:
///   name: azure-default
/// spec:
///   credentials:
///     source: Secret
///     secretRef:
///       name: azure-credentials
///       namespace: octopilot-system
///       key: credentials.json
/// ```
#[derive(kube::CustomResource, Debug, Clone, Deserialize, Serialize, schemars::JsonSchema)]
#[kube(
    kind = "ProviderConfig",
    group = "appservice.octopilot.io",
    version = "v1alpha1",
    shortname = "apc",
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfigSpec {
    /// Where the Azure credential document comes from
    pub credentials: CredentialSource,
}

/// Source of the raw Azure credential document
///
/// The document itself is JSON (tenant, client id/secret, subscription,
/// optional sovereign-cloud endpoint overrides); this enum only selects
/// where the bytes are read from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all_fields = "camelCase", tag = "source")]
pub enum CredentialSource {
    /// Read the credential document from a Kubernetes Secret key
    Secret {
        /// Secret holding the credential document
        secret_ref: SecretKeySelector,
    },
    /// Read the credential document from an environment variable of the
    /// controller process
    Environment {
        /// Name of the environment variable
        variable: String,
    },
    /// Read the credential document from a file mounted into the
    /// controller pod
    Filesystem {
        /// Path to the credential file
        path: String,
    },
}

/// Selector for a single key inside a namespaced Secret
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretKeySelector {
    /// Name of the Secret
    pub name: String,
    /// Namespace of the Secret
    pub namespace: String,
    /// Key within the Secret data
    pub key: String,
}

/// ProviderConfigUsage Custom Resource Definition
///
/// One usage object per PublishingProfile consuming a ProviderConfig.
/// Applied server-side on every Connect so operators can see which configs
/// are in use before deleting them.
#[derive(kube::CustomResource, Debug, Clone, Deserialize, Serialize, schemars::JsonSchema)]
#[kube(
    kind = "ProviderConfigUsage",
    group = "appservice.octopilot.io",
    version = "v1alpha1",
    shortname = "apcu",
    printcolumn = r#"{"name":"Config", "type":"string", "jsonPath":".spec.providerConfigName"}, {"name":"Resource", "type":"string", "jsonPath":".spec.resourceName"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfigUsageSpec {
    /// Name of the consumed ProviderConfig
    pub provider_config_name: String,
    /// Kind of the consuming resource
    pub resource_kind: String,
    /// Name of the consuming resource
    pub resource_name: String,
}
