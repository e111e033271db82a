//! # Provider Modules
//!
//! Provider-side API access for the controller.
//!
//! The `WebAppsApi` trait is the seam between the lifecycle state machine
//! and the Azure Resource Manager REST API; tests substitute scripted
//! implementations.

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::Deserialize;
use thiserror::Error;

pub mod azure;

/// Streamed publishing-profile response body.
///
/// Returned unread so body-drain failures stay distinguishable from the
/// fetch call itself.
pub type ProfileStream = BoxStream<'static, Result<bytes::Bytes, ProviderApiError>>;

/// Errors from provider-side API calls.
///
/// These propagate to the reconciliation driver unmodified; the driver owns
/// retry scheduling and backoff. A not-found site is an `Api` error like any
/// other status: the App Service is owned elsewhere and expected to exist.
#[derive(Debug, Error)]
pub enum ProviderApiError {
    /// Request never produced a response (DNS, connect, timeout)
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// ARM returned a non-success status
    #[error("azure api returned {status} for {url}: {body}")]
    Api {
        status: reqwest::StatusCode,
        url: String,
        body: String,
    },
    /// Management token acquisition failed
    #[error("cannot acquire management token: {0}")]
    Token(#[source] azure_core::Error),
    /// Response body could not be read or decoded
    #[error("error reading response body: {0}")]
    Body(#[source] reqwest::Error),
}

/// Minimal view of an App Service site, as returned by the existence check
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct SiteInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub properties: Option<SiteProperties>,
}

/// Site properties subset
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct SiteProperties {
    #[serde(default)]
    pub state: Option<String>,
}

/// Export format of the publishing-profile document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishingProfileFormat {
    WebDeploy,
    Ftp,
    FileZilla3,
}

impl PublishingProfileFormat {
    /// ARM wire value
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WebDeploy => "WebDeploy",
            Self::Ftp => "Ftp",
            Self::FileZilla3 => "FileZilla3",
        }
    }
}

/// Options for the publishing-profile fetch call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishingProfileOptions {
    pub format: PublishingProfileFormat,
    pub include_disaster_recovery_endpoints: bool,
}

impl Default for PublishingProfileOptions {
    fn default() -> Self {
        Self {
            format: PublishingProfileFormat::WebDeploy,
            include_disaster_recovery_endpoints: false,
        }
    }
}

/// Azure Web Apps API surface consumed by the lifecycle state machine
#[async_trait]
pub trait WebAppsApi: Send + Sync {
    /// Existence check on the App Service site.
    ///
    /// Errors (including not-found) are returned verbatim; the caller makes
    /// no assumption about their meaning.
    async fn get_site(
        &self,
        resource_group: &str,
        site_name: &str,
    ) -> Result<SiteInfo, ProviderApiError>;

    /// Request the publishing-profile document for the site.
    ///
    /// Idempotent provider-side: repeating the call after a failure fetches
    /// the same document.
    async fn fetch_publishing_profile(
        &self,
        resource_group: &str,
        site_name: &str,
        options: &PublishingProfileOptions,
    ) -> Result<ProfileStream, ProviderApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_wire_values() {
        assert_eq!(PublishingProfileFormat::WebDeploy.as_str(), "WebDeploy");
        assert_eq!(PublishingProfileFormat::Ftp.as_str(), "Ftp");
        assert_eq!(PublishingProfileFormat::FileZilla3.as_str(), "FileZilla3");
    }

    #[test]
    fn test_default_options_exclude_disaster_recovery() {
        let options = PublishingProfileOptions::default();
        assert_eq!(options.format, PublishingProfileFormat::WebDeploy);
        assert!(!options.include_disaster_recovery_endpoints);
    }

    #[test]
    fn test_site_info_deserializes_arm_payload() {
        let site: SiteInfo = serde_json::from_str(
            r#"{"id":"/subscriptions/s/resourceGroups/rg/providers/Microsoft.Web/sites/web",
                "name":"web","location":"westeurope","properties":{"state":"Running"}}"#,
        )
        .expect("site payload deserializes");
        assert_eq!(site.name.as_deref(), Some("web"));
        assert_eq!(
            site.properties.and_then(|p| p.state).as_deref(),
            Some("Running")
        );
    }
}
