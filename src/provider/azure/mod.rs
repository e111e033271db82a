//! # Azure Web Apps Client
//!
//! Client for the Azure Resource Manager Microsoft.Web API.
//!
//! This module provides functionality to:
//! - Deserialize the Azure credential document handed out by a ProviderConfig
//! - Build a `ClientSecretCredential` and a subscription-scoped REST client
//! - Check App Service existence and fetch the publishing-profile document

mod auth;
mod web_apps;

pub use web_apps::WebAppsClient;

use serde::Deserialize;
use thiserror::Error;

/// Errors from the two-stage client factory.
///
/// Each construction stage fails independently and distinguishably:
/// credential-document parsing, authentication-object construction, and
/// HTTP-client construction.
#[derive(Debug, Error)]
pub enum ClientFactoryError {
    #[error("error deserializing credentials: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error("error creating client secret credential: {0}")]
    Credential(#[source] azure_core::Error),
    #[error("error constructing web apps client: {0}")]
    Factory(#[source] reqwest::Error),
}

/// Azure credential document, as stored in the ProviderConfig source.
///
/// The endpoint overrides support sovereign clouds; unset fields fall back
/// to the public-cloud defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureApiCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub subscription_id: String,
    pub tenant_id: String,
    #[serde(default)]
    pub active_directory_endpoint_url: Option<String>,
    #[serde(default)]
    pub resource_manager_endpoint_url: Option<String>,
    #[serde(default)]
    pub active_directory_graph_resource_id: Option<String>,
    #[serde(default)]
    pub sql_management_endpoint_url: Option<String>,
    #[serde(default)]
    pub gallery_endpoint_url: Option<String>,
    #[serde(default)]
    pub management_endpoint_url: Option<String>,
}
