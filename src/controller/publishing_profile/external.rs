//! # PublishingProfile External Client
//!
//! The fetch-once lifecycle state machine. The publishing profile of an App
//! Service has no provider-side create, update, or delete: the only real
//! operation is a one-time fetch performed lazily by Observe, and deletion
//! is purely local bookkeeping ("virtual retirement").

use async_trait::async_trait;
use futures::StreamExt;
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, info};

use crate::constants::CONNECTION_SECRET_KEY_PROFILE_XML;
use crate::controller::external::{
    ConnectionDetails, Creation, ExternalClient, ExternalError, Observation, Update,
};
use crate::crd::{Condition, PublishingProfileStatus};
use crate::observability::metrics;
use crate::provider::{PublishingProfileOptions, WebAppsApi};

use super::{profile_of, status_of};

/// Lifecycle state, derived from the persisted status flags.
///
/// The flag combination `deleted_virtually && !profile_gotten` is rejected:
/// nothing that was never fetched can be retired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileState {
    /// The one-time fetch has not happened yet
    Unfetched,
    /// Fetched; the object is live and the document was published
    FetchedLive,
    /// Fetched, then deletion was requested; the object reads as gone
    FetchedRetired,
}

impl ProfileState {
    /// Derive the state from persisted flags, rejecting the unreachable
    /// combination
    pub fn derive(status: &PublishingProfileStatus) -> Result<Self, ExternalError> {
        match (status.profile_gotten, status.deleted_virtually) {
            (false, false) => Ok(Self::Unfetched),
            (true, false) => Ok(Self::FetchedLive),
            (true, true) => Ok(Self::FetchedRetired),
            (false, true) => Err(ExternalError::RetiredWithoutFetch),
        }
    }
}

/// External client bound to one authenticated ARM session
pub struct PublishingProfileClient {
    api: Arc<dyn WebAppsApi>,
}

impl std::fmt::Debug for PublishingProfileClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishingProfileClient").finish_non_exhaustive()
    }
}

impl PublishingProfileClient {
    #[must_use]
    pub fn new(api: Arc<dyn WebAppsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ExternalClient for PublishingProfileClient {
    async fn observe(
        &self,
        resource: &(dyn Any + Send + Sync),
        status: &mut (dyn Any + Send),
    ) -> Result<Observation, ExternalError> {
        let profile = profile_of(resource)?;
        let status = status_of(status)?;

        // The site must be reachable before anything else is decided;
        // errors (including not-found) propagate verbatim
        self.api
            .get_site(
                &profile.spec.resource_group_name,
                &profile.spec.app_service_name,
            )
            .await?;

        match ProfileState::derive(status)? {
            ProfileState::FetchedRetired => {
                // Retirement is local; the site still exists provider-side,
                // but the object reads as reconciled-and-gone
                debug!(
                    app_service = %profile.spec.app_service_name,
                    "Virtually deleted, reporting as gone"
                );
                Ok(Observation {
                    resource_exists: false,
                    resource_up_to_date: true,
                    connection_details: ConnectionDetails::new(),
                })
            }
            ProfileState::FetchedLive => {
                // Already fetched; the document is never re-emitted
                Ok(Observation {
                    resource_exists: true,
                    resource_up_to_date: true,
                    connection_details: ConnectionDetails::new(),
                })
            }
            ProfileState::Unfetched => {
                let stream = self
                    .api
                    .fetch_publishing_profile(
                        &profile.spec.resource_group_name,
                        &profile.spec.app_service_name,
                        &PublishingProfileOptions::default(),
                    )
                    .await
                    .map_err(ExternalError::FetchProfile)?;

                let document = drain(stream).await.map_err(ExternalError::BodyRead)?;

                // Status flips only after the document is fully in memory;
                // any earlier failure leaves the fetch retryable
                status.profile_gotten = true;
                status.deleted_virtually = false;
                status.set_condition(Condition::available());
                metrics::increment_profile_fetches();

                info!(
                    app_service = %profile.spec.app_service_name,
                    bytes = document.len(),
                    "Publishing profile fetched"
                );

                let mut connection_details = ConnectionDetails::new();
                connection_details
                    .insert(CONNECTION_SECRET_KEY_PROFILE_XML.to_string(), document);

                Ok(Observation {
                    resource_exists: true,
                    resource_up_to_date: true,
                    connection_details,
                })
            }
        }
    }

    async fn create(&self, resource: &(dyn Any + Send + Sync)) -> Result<Creation, ExternalError> {
        // Nothing to provision: the App Service pre-exists and is owned
        // elsewhere; creation is represented by Observe's lazy fetch
        let _profile = profile_of(resource)?;
        Ok(Creation::default())
    }

    async fn update(&self, resource: &(dyn Any + Send + Sync)) -> Result<Update, ExternalError> {
        // No mutable provider-side state once fetched
        let _profile = profile_of(resource)?;
        Ok(Update::default())
    }

    async fn delete(
        &self,
        resource: &(dyn Any + Send + Sync),
        status: &mut (dyn Any + Send),
    ) -> Result<(), ExternalError> {
        let profile = profile_of(resource)?;
        let status = status_of(status)?;

        // The fetched document cannot be revoked, so no provider call is
        // made. The guard keeps `deleted_virtually => profile_gotten` true
        // in every reachable state.
        if status.profile_gotten {
            status.deleted_virtually = true;
            info!(
                app_service = %profile.spec.app_service_name,
                "Marked publishing profile as virtually deleted"
            );
        }
        Ok(())
    }
}

async fn drain(
    mut stream: crate::provider::ProfileStream,
) -> Result<Vec<u8>, crate::provider::ProviderApiError> {
    let mut document = Vec::new();
    while let Some(chunk) = stream.next().await {
        document.extend_from_slice(&chunk?);
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{
        ProviderConfigReference, PublishingProfile, PublishingProfileSpec, CONDITION_TYPE_AVAILABLE,
    };
    use crate::provider::{ProfileStream, ProviderApiError, SiteInfo};
    use futures::stream;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Scriptable provider API: counts calls, fails on demand
    #[derive(Default)]
    struct ScriptedApi {
        payload: Vec<u8>,
        site_calls: AtomicUsize,
        fetch_calls: AtomicUsize,
        fail_site_check: AtomicBool,
        fail_fetch: AtomicBool,
        fail_body: AtomicBool,
    }

    impl ScriptedApi {
        fn with_payload(payload: &[u8]) -> Self {
            Self {
                payload: payload.to_vec(),
                ..Default::default()
            }
        }

        fn error(reason: &str) -> ProviderApiError {
            ProviderApiError::Api {
                status: reqwest::StatusCode::BAD_GATEWAY,
                url: "https://management.azure.com/test".to_string(),
                body: reason.to_string(),
            }
        }
    }

    #[async_trait]
    impl WebAppsApi for ScriptedApi {
        async fn get_site(
            &self,
            _resource_group: &str,
            _site_name: &str,
        ) -> Result<SiteInfo, ProviderApiError> {
            self.site_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_site_check.load(Ordering::SeqCst) {
                return Err(Self::error("site check failed"));
            }
            Ok(SiteInfo::default())
        }

        async fn fetch_publishing_profile(
            &self,
            _resource_group: &str,
            _site_name: &str,
            options: &PublishingProfileOptions,
        ) -> Result<ProfileStream, ProviderApiError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            assert!(!options.include_disaster_recovery_endpoints);
            if self.fail_fetch.load(Ordering::SeqCst) {
                return Err(Self::error("fetch failed"));
            }
            if self.fail_body.load(Ordering::SeqCst) {
                let chunks: Vec<Result<bytes::Bytes, ProviderApiError>> = vec![
                    Ok(bytes::Bytes::from_static(b"<publi")),
                    Err(Self::error("stream interrupted")),
                ];
                return Ok(stream::iter(chunks).boxed());
            }
            let chunks: Vec<Result<bytes::Bytes, ProviderApiError>> =
                vec![Ok(bytes::Bytes::from(self.payload.clone()))];
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

    fn client(api: &Arc<ScriptedApi>) -> PublishingProfileClient {
        PublishingProfileClient::new(Arc::clone(api) as Arc<dyn WebAppsApi>)
    }

    #[tokio::test]
    async fn test_first_observe_fetches_once_and_emits_artifact() {
        let api = Arc::new(ScriptedApi::with_payload(b"<publishData/>"));
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
        assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetched_live_observe_emits_nothing() {
        let api = Arc::new(ScriptedApi::with_payload(b"<publishData/>"));
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

    #[tokio::test]
    async fn test_retired_observe_reports_gone_despite_existing_site() {
        let api = Arc::new(ScriptedApi::with_payload(b"<publishData/>"));
        let client = client(&api);
        let profile = profile();
        let mut status = PublishingProfileStatus {
            profile_gotten: true,
            deleted_virtually: true,
            ..Default::default()
        };

        let observation = client
            .observe(&profile, &mut status)
            .await
            .expect("observe succeeds");

        assert!(!observation.resource_exists);
        assert!(observation.resource_up_to_date);
        assert!(observation.connection_details.is_empty());
        // The existence check still ran; retirement is purely local
        assert_eq!(api.site_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_site_check_error_propagates_without_fetching() {
        let api = Arc::new(ScriptedApi::with_payload(b"<publishData/>"));
        api.fail_site_check.store(true, Ordering::SeqCst);
        let client = client(&api);
        let profile = profile();
        let mut status = PublishingProfileStatus::default();

        let err = client
            .observe(&profile, &mut status)
            .await
            .expect_err("must fail");

        assert!(matches!(err, ExternalError::Provider(_)));
        assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 0);
        assert!(!status.profile_gotten);
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_status_untouched() {
        let api = Arc::new(ScriptedApi::with_payload(b"<publishData/>"));
        api.fail_fetch.store(true, Ordering::SeqCst);
        let client = client(&api);
        let profile = profile();
        let mut status = PublishingProfileStatus::default();

        let err = client
            .observe(&profile, &mut status)
            .await
            .expect_err("must fail");

        assert!(matches!(err, ExternalError::FetchProfile(_)));
        assert!(!status.profile_gotten);
        assert!(!status.deleted_virtually);
        assert!(status.conditions.is_empty());
    }

    #[tokio::test]
    async fn test_body_read_failure_leaves_status_untouched() {
        let api = Arc::new(ScriptedApi::with_payload(b"<publishData/>"));
        api.fail_body.store(true, Ordering::SeqCst);
        let client = client(&api);
        let profile = profile();
        let mut status = PublishingProfileStatus::default();

        let err = client
            .observe(&profile, &mut status)
            .await
            .expect_err("must fail");

        assert!(matches!(err, ExternalError::BodyRead(_)));
        assert!(!status.profile_gotten);
        assert!(status.conditions.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_happens_at_most_once_across_observe_sequence() {
        let api = Arc::new(ScriptedApi::with_payload(b"<publishData/>"));
        let client = client(&api);
        let profile = profile();
        let mut status = PublishingProfileStatus::default();

        // First attempt fails; status must stay Unfetched so the retry
        // fetches again
        api.fail_fetch.store(true, Ordering::SeqCst);
        client
            .observe(&profile, &mut status)
            .await
            .expect_err("scripted failure");
        assert!(!status.profile_gotten);

        // Retry succeeds and emits the document
        api.fail_fetch.store(false, Ordering::SeqCst);
        let observation = client
            .observe(&profile, &mut status)
            .await
            .expect("retry succeeds");
        assert!(!observation.connection_details.is_empty());

        // Every further observation is fetch-free and artifact-free
        for _ in 0..3 {
            let observation = client
                .observe(&profile, &mut status)
                .await
                .expect("steady state");
            assert!(observation.connection_details.is_empty());
        }
        assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_delete_retires_fetched_object() {
        let api = Arc::new(ScriptedApi::with_payload(b"<publishData/>"));
        let client = client(&api);
        let profile = profile();
        let mut status = PublishingProfileStatus {
            profile_gotten: true,
            ..Default::default()
        };

        client
            .delete(&profile, &mut status)
            .await
            .expect("delete always succeeds");
        assert!(status.deleted_virtually);

        // Monotone: observes after retirement always report gone
        for _ in 0..2 {
            let observation = client
                .observe(&profile, &mut status)
                .await
                .expect("observe succeeds");
            assert!(!observation.resource_exists);
            assert!(observation.resource_up_to_date);
        }
    }

    #[tokio::test]
    async fn test_delete_on_unfetched_object_keeps_invariant() {
        let api = Arc::new(ScriptedApi::with_payload(b"<publishData/>"));
        let client = client(&api);
        let profile = profile();
        let mut status = PublishingProfileStatus::default();

        client
            .delete(&profile, &mut status)
            .await
            .expect("delete always succeeds");

        // Nothing was fetched, so nothing is retired
        assert!(!status.deleted_virtually);
        assert!(!status.profile_gotten);
    }

    #[tokio::test]
    async fn test_inconsistent_flags_are_rejected() {
        let api = Arc::new(ScriptedApi::with_payload(b"<publishData/>"));
        let client = client(&api);
        let profile = profile();
        let mut status = PublishingProfileStatus {
            profile_gotten: false,
            deleted_virtually: true,
            ..Default::default()
        };

        let err = client
            .observe(&profile, &mut status)
            .await
            .expect_err("must fail");
        assert!(matches!(err, ExternalError::RetiredWithoutFetch));
    }

    #[tokio::test]
    async fn test_wrong_resource_kind_is_a_contract_violation() {
        let api = Arc::new(ScriptedApi::default());
        let client = client(&api);
        let not_a_profile = 42_u32;
        let mut status = PublishingProfileStatus::default();

        let err = client
            .observe(&not_a_profile, &mut status)
            .await
            .expect_err("must fail");
        assert!(matches!(err, ExternalError::ResourceKindMismatch { .. }));
        // The contract check runs before any provider call
        assert_eq!(api.site_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_create_and_update_are_noops() {
        let api = Arc::new(ScriptedApi::default());
        let client = client(&api);
        let profile = profile();

        let creation = client.create(&profile).await.expect("create succeeds");
        assert!(creation.connection_details.is_empty());

        let update = client.update(&profile).await.expect("update succeeds");
        assert!(update.connection_details.is_empty());

        assert_eq!(api.site_calls.load(Ordering::SeqCst), 0);
        assert_eq!(api.fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_profile_state_derivation() {
        let unfetched = PublishingProfileStatus::default();
        assert_eq!(
            ProfileState::derive(&unfetched).expect("valid"),
            ProfileState::Unfetched
        );

        let live = PublishingProfileStatus {
            profile_gotten: true,
            ..Default::default()
        };
        assert_eq!(
            ProfileState::derive(&live).expect("valid"),
            ProfileState::FetchedLive
        );

        let retired = PublishingProfileStatus {
            profile_gotten: true,
            deleted_virtually: true,
            ..Default::default()
        };
        assert_eq!(
            ProfileState::derive(&retired).expect("valid"),
            ProfileState::FetchedRetired
        );

        let broken = PublishingProfileStatus {
            deleted_virtually: true,
            ..Default::default()
        };
        assert!(ProfileState::derive(&broken).is_err());
    }
}
