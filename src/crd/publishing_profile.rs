//! # PublishingProfile Spec
//!
//! Desired-state types for the one-time publishing-profile fetch.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// PublishingProfile Custom Resource Definition
///
/// Declares a one-time fetch of the publishing profile (deployment
/// credentials document) of an existing Azure App Service. The profile is
/// fetched at most once per object and published as a connection secret;
/// deleting the object only retires it virtually, because the fetched
/// document cannot be revoked provider-side.
///
/// # Example
///
/// ```yaml
/// apiVersion: appservice.octopilot.io/v1alpha1
/// kind: PublishingProfile
/// metadata:
///   name: storefront-profile
/// spec:
///   resource_group_name: storefront-rg
///   app_service_name: storefront-web
///   providerConfigRef:
///     name: azure-default
///   writeConnectionSecretToRef:
///     name: storefront-publish-profile
///     namespace: storefront
/// ```
#[derive(kube::CustomResource, Debug, Clone, Deserialize, Serialize, schemars::JsonSchema)]
#[kube(
    kind = "PublishingProfile",
    group = "appservice.octopilot.io",
    version = "v1alpha1",
    status = "crate::crd::PublishingProfileStatus",
    shortname = "pubprof",
    printcolumn = r#"{"name":"Ready", "type":"string", "jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}, {"name":"Fetched", "type":"boolean", "jsonPath":".status.profile_gotten"}, {"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct PublishingProfileSpec {
    /// Azure resource group containing the App Service
    // Wire key is snake_case for compatibility with existing objects
    #[serde(rename = "resource_group_name")]
    pub resource_group_name: String,
    /// Name of the App Service (site) whose profile is fetched.
    /// The site is owned elsewhere; this controller never creates or
    /// mutates it.
    #[serde(rename = "app_service_name")]
    pub app_service_name: String,
    /// Linked database resource, referenced by name
    #[serde(default)]
    pub database: Option<String>,
    /// Linked database resource, referenced via object reference
    #[serde(default)]
    pub database_ref: Option<ResourceReference>,
    /// Linked database resource, selected via labels
    #[serde(default)]
    pub database_selector: Option<ResourceSelector>,
    /// ProviderConfig supplying the Azure credentials for this object
    pub provider_config_ref: ProviderConfigReference,
    /// Secret the fetched profile document is published to.
    /// If unset, the fetch still happens but the document is discarded
    /// with a warning.
    #[serde(default)]
    pub write_connection_secret_to_ref: Option<ConnectionSecretReference>,
}

/// Reference to another API object by name
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceReference {
    /// Name of the referenced object
    pub name: String,
}

/// Label selector for referencing another API object
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSelector {
    /// Labels the referenced object must carry
    #[serde(default)]
    pub match_labels: BTreeMap<String, String>,
}

/// Reference to the ProviderConfig used by this resource
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfigReference {
    /// Name of the ProviderConfig (cluster-scoped)
    pub name: String,
}

/// Namespaced Secret reference for publishing connection details
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSecretReference {
    /// Name of the Secret
    pub name: String,
    /// Namespace the Secret is written to
    pub namespace: String,
}
