//! # Azure Web Apps Operations
//!
//! Implements the `WebAppsApi` trait against the ARM REST API.

use async_trait::async_trait;
use azure_core::credentials::{TokenCredential, TokenRequestOptions};
use futures::{StreamExt, TryStreamExt};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::constants::{
    ARM_REQUEST_TIMEOUT_SECS, ARM_WEB_API_VERSION, DEFAULT_MANAGEMENT_ENDPOINT,
};
use crate::observability::metrics;
use crate::provider::{
    ProfileStream, ProviderApiError, PublishingProfileOptions, SiteInfo, WebAppsApi,
};

use super::{auth, AzureApiCredentials, ClientFactoryError};

/// Subscription-scoped client for the Microsoft.Web resource provider
pub struct WebAppsClient {
    http: reqwest::Client,
    credential: Arc<dyn TokenCredential>,
    subscription_id: String,
    management_endpoint: String,
}

impl std::fmt::Debug for WebAppsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebAppsClient")
            .field("subscription_id", &self.subscription_id)
            .field("management_endpoint", &self.management_endpoint)
            .finish_non_exhaustive()
    }
}

impl WebAppsClient {
    /// Two-stage factory: deserialize the credential document, build the
    /// authentication object, then the subscription-scoped client.
    ///
    /// The decode target is local to this call; concurrent connects never
    /// share a buffer.
    pub fn from_credential_bytes(credential_bytes: &[u8]) -> Result<Self, ClientFactoryError> {
        let document: AzureApiCredentials = serde_json::from_slice(credential_bytes)?;

        let credential =
            auth::client_secret_credential(&document).map_err(ClientFactoryError::Credential)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(ARM_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(ClientFactoryError::Factory)?;

        let management_endpoint = document
            .resource_manager_endpoint_url
            .clone()
            .unwrap_or_else(|| DEFAULT_MANAGEMENT_ENDPOINT.to_string());

        Ok(Self {
            http,
            credential,
            subscription_id: document.subscription_id,
            management_endpoint,
        })
    }

    /// Subscription the client is scoped to
    #[must_use]
    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    fn site_url(&self, resource_group: &str, site_name: &str) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Web/sites/{}",
            self.management_endpoint.trim_end_matches('/'),
            self.subscription_id,
            resource_group,
            site_name
        )
    }

    async fn bearer_token(&self) -> Result<String, ProviderApiError> {
        let scope = format!("{}/.default", self.management_endpoint.trim_end_matches('/'));
        let token = self
            .credential
            .get_token(&[scope.as_str()], Some(TokenRequestOptions::default()))
            .await
            .map_err(ProviderApiError::Token)?;
        Ok(token.token.secret().to_string())
    }
}

#[async_trait]
impl WebAppsApi for WebAppsClient {
    async fn get_site(
        &self,
        resource_group: &str,
        site_name: &str,
    ) -> Result<SiteInfo, ProviderApiError> {
        let url = format!(
            "{}?api-version={ARM_WEB_API_VERSION}",
            self.site_url(resource_group, site_name)
        );
        let token = self.bearer_token().await?;
        let start = Instant::now();

        debug!(
            resource_group = resource_group,
            site_name = site_name,
            "Checking App Service existence"
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|source| ProviderApiError::Transport {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            metrics::increment_azure_api_errors("get_site");
            return Err(ProviderApiError::Api { status, url, body });
        }

        let site = response.json::<SiteInfo>().await.map_err(ProviderApiError::Body)?;
        metrics::record_azure_api_operation("get_site", start.elapsed().as_secs_f64());
        Ok(site)
    }

    async fn fetch_publishing_profile(
        &self,
        resource_group: &str,
        site_name: &str,
        options: &PublishingProfileOptions,
    ) -> Result<ProfileStream, ProviderApiError> {
        let url = format!(
            "{}/publishxml?api-version={ARM_WEB_API_VERSION}",
            self.site_url(resource_group, site_name)
        );
        let token = self.bearer_token().await?;
        let start = Instant::now();

        info!(
            resource_group = resource_group,
            site_name = site_name,
            format = options.format.as_str(),
            "Fetching publishing profile"
        );

        let body = json!({
            "format": options.format.as_str(),
            "includeDisasterRecoveryEndpoints": options.include_disaster_recovery_endpoints,
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|source| ProviderApiError::Transport {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            metrics::increment_azure_api_errors("fetch_publishing_profile");
            return Err(ProviderApiError::Api { status, url, body });
        }

        metrics::record_azure_api_operation(
            "fetch_publishing_profile",
            start.elapsed().as_secs_f64(),
        );

        Ok(response
            .bytes_stream()
            .map_err(ProviderApiError::Body)
            .boxed())
    }
}
