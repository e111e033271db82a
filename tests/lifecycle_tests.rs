//! # Lifecycle Tests
//!
//! End-to-end walkthroughs of the fetch-once lifecycle against a scripted
//! provider API, exercising the state machine through the public interface:
//! fresh fetch, steady state, virtual deletion, and failure behavior.

use async_trait::async_trait;
use futures::{stream, StreamExt};
use publishing_profile_controller::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Provider API double that serves a fixed document and fails on demand
#[derive(Default)]
struct FakeWebApps {
    document: Vec<u8>,
    site_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    site_unreachable: AtomicBool,
    fetch_unreachable: AtomicBool,
}

impl FakeWebApps {
    fn serving(document: &[u8]) -> Arc<Self> {
        Arc::new(Self {
            document: document.to_vec(),
            ..Default::default()
        })
    }

    fn unreachable_error() -> ProviderApiError {
        ProviderApiError::Api {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            url: "https://management.azure.com/subscriptions/s".to_string(),
            body: "upstream unavailable".to_string(),
        }
    }
}

#[async_trait]
impl WebAppsApi for FakeWebApps {
    async fn get_site(
        &self,
        resource_group: &str,
        site_name: &str,
    ) -> Result<SiteInfo, ProviderApiError> {
        assert_eq!(resource_group, "storefront-rg");
        assert_eq!(site_name, "storefront-web");
        self.site_calls.fetch_add(1, Ordering::SeqCst);
        if self.site_unreachable.load(Ordering::SeqCst) {
            return Err(Self::unreachable_error());
        }
        Ok(SiteInfo::default())
    }

    async fn fetch_publishing_profile(
        &self,
        _resource_group: &str,
        _site_name: &str,
        options: &PublishingProfileOptions,
    ) -> Result<publishing_profile_controller::provider::ProfileStream, ProviderApiError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        // The fetch always requests the WebDeploy export without
        // disaster-recovery endpoints
        assert_eq!(options.format, PublishingProfileFormat::WebDeploy);
        assert!(!options.include_disaster_recovery_endpoints);
        if self.fetch_unreachable.load(Ordering::SeqCst) {
            return Err(Self::unreachable_error());
        }
        let chunks: Vec<Result<bytes::Bytes, ProviderApiError>> =
            vec![Ok(bytes::Bytes::from(self.document.clone()))];
        Ok(stream::iter(chunks).boxed())
    }
}

fn profile() -> PublishingProfile {
    PublishingProfile::new(
        "storefront-profile",
        PublishingProfileSpec {
            resource_group_name: "storefront-rg".to_string(),
            app_service_name: "storefront-web".to_string(),
            database: None,
            database_ref: None,
            database_selector: None,
            provider_config_ref: ProviderConfigReference {
                name: "azure-default".to_string(),
            },
            write_connection_secret_to_ref: None,
        },
    )
}

fn client(api: &Arc<FakeWebApps>) -> PublishingProfileClient {
    PublishingProfileClient::new(Arc::clone(api) as Arc<dyn WebAppsApi>)
}

/// Fresh object: the first observe fetches, flips status, and emits the
/// document exactly once
#[tokio::test]
async fn test_fresh_object_fetches_and_emits_artifact() {
    let api = FakeWebApps::serving(b"<publishData/>");
    let client = client(&api);
    let profile = profile();
    let mut status = PublishingProfileStatus::default();

    let observation = client
        .observe(&profile, &mut status)
        .await
        .expect("observe succeeds");

    assert!(observation.resource_exists);
    assert!(observation.resource_up_to_date);
    assert_eq!(
        observation.connection_details.get("publishingProfileXML"),
        Some(&b"<publishData/>".to_vec())
    );
    assert!(status.profile_gotten);
    assert!(!status.deleted_virtually);
    assert!(status.condition(CONDITION_TYPE_AVAILABLE).is_some());
}

/// Already-fetched object: observe reports converged with no artifact
#[tokio::test]
async fn test_fetched_object_reports_converged_without_artifact() {
    let api = FakeWebApps::serving(b"<publishData/>");
    let client = client(&api);
    let profile = profile();
    let mut status = PublishingProfileStatus {
        profile_gotten: true,
        ..Default::default()
    };

    let observation = client
        .observe(&profile, &mut status)
        .await
        .expect("observe succeeds");

    assert!(observation.resource_exists);
    assert!(observation.resource_up_to_date);
    assert!(observation.connection_details.is_empty());
    assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 0);
}

/// Delete then observe: retirement is monotone and purely local
#[tokio::test]
async fn test_delete_then_observe_reports_gone() {
    let api = FakeWebApps::serving(b"<publishData/>");
    let client = client(&api);
    let profile = profile();
    let mut status = PublishingProfileStatus {
        profile_gotten: true,
        ..Default::default()
    };

    client
        .delete(&profile, &mut status)
        .await
        .expect("delete succeeds");
    assert!(status.profile_gotten);
    assert!(status.deleted_virtually);

    let observation = client
        .observe(&profile, &mut status)
        .await
        .expect("observe succeeds");
    assert!(!observation.resource_exists);
    assert!(observation.resource_up_to_date);
    // The provider-side site was checked but never touched
    assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 0);
}

/// Network failure during the fetch leaves status untouched and retryable
#[tokio::test]
async fn test_fetch_failure_is_retryable() {
    let api = FakeWebApps::serving(b"<publishData/>");
    let client = client(&api);
    let profile = profile();
    let mut status = PublishingProfileStatus::default();

    api.fetch_unreachable.store(true, Ordering::SeqCst);
    let err = client
        .observe(&profile, &mut status)
        .await
        .expect_err("scripted failure");
    assert!(err.to_string().starts_with("error getting publishing profile"));
    assert!(!status.profile_gotten);
    assert!(!status.deleted_virtually);

    // The retry performs the fetch as if nothing happened
    api.fetch_unreachable.store(false, Ordering::SeqCst);
    let observation = client
        .observe(&profile, &mut status)
        .await
        .expect("retry succeeds");
    assert!(status.profile_gotten);
    assert!(!observation.connection_details.is_empty());
}

/// The full object lifetime: fetch once, settle, retire
#[tokio::test]
async fn test_full_lifecycle_sequence() {
    let api = FakeWebApps::serving(b"<publishData/>");
    let client = client(&api);
    let profile = profile();
    let mut status = PublishingProfileStatus::default();

    // 1. First observe performs the one-time fetch
    let first = client
        .observe(&profile, &mut status)
        .await
        .expect("first observe");
    assert!(!first.connection_details.is_empty());

    // 2. Steady state: no re-fetch, no re-emission
    for _ in 0..3 {
        let steady = client
            .observe(&profile, &mut status)
            .await
            .expect("steady observe");
        assert!(steady.resource_exists);
        assert!(steady.connection_details.is_empty());
    }

    // 3. Deletion retires the object locally
    client
        .delete(&profile, &mut status)
        .await
        .expect("delete succeeds");

    // 4. From then on the object reads as reconciled-and-gone
    let gone = client
        .observe(&profile, &mut status)
        .await
        .expect("post-delete observe");
    assert!(!gone.resource_exists);
    assert!(gone.resource_up_to_date);

    // Across the whole lifetime the provider fetch happened exactly once
    assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 1);
}

/// An unreachable site fails every state, including retired ones
#[tokio::test]
async fn test_site_check_failure_blocks_all_states() {
    let api = FakeWebApps::serving(b"<publishData/>");
    api.site_unreachable.store(true, Ordering::SeqCst);
    let client = client(&api);
    let profile = profile();

    for (gotten, deleted) in [(false, false), (true, false), (true, true)] {
        let mut status = PublishingProfileStatus {
            profile_gotten: gotten,
            deleted_virtually: deleted,
            ..Default::default()
        };
        let before = status.clone();
        let err = client
            .observe(&profile, &mut status)
            .await
            .expect_err("site check fails");
        assert!(matches!(err, ExternalError::Provider(_)));
        assert_eq!(status.profile_gotten, before.profile_gotten);
        assert_eq!(status.deleted_virtually, before.deleted_virtually);
    }
    assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 0);
}
