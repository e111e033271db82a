//! # Constants
//!
//! Shared constants used throughout the controller.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Default HTTP server port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 5000;

/// Default requeue interval for successful reconciliations (seconds)
/// Level-triggered: every object is re-observed on this cadence
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Default requeue interval for reconciliation errors (seconds)
/// Used when the per-resource backoff state is unavailable
pub const DEFAULT_RECONCILIATION_ERROR_REQUEUE_SECS: u64 = 60;

/// Fibonacci error backoff minimum (minutes)
pub const ERROR_BACKOFF_MIN_MINUTES: u64 = 1;

/// Fibonacci error backoff maximum (minutes)
pub const ERROR_BACKOFF_MAX_MINUTES: u64 = 10;

/// Finalizer placed on PublishingProfile objects so virtual deletion is
/// recorded before the object disappears
pub const FINALIZER: &str = "appservice.octopilot.io/publishing-profile";

/// Connection-secret key under which the fetched profile document is published
pub const CONNECTION_SECRET_KEY_PROFILE_XML: &str = "publishingProfileXML";

/// Field manager name used for server-side apply patches
pub const FIELD_MANAGER: &str = "publishing-profile-controller";

/// Default Azure Resource Manager endpoint
/// Overridable per ProviderConfig via the credential document's
/// `resourceManagerEndpointUrl` field (sovereign clouds)
pub const DEFAULT_MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";

/// ARM Microsoft.Web API version used for site and publishxml requests
pub const ARM_WEB_API_VERSION: &str = "2024-04-01";

/// Request timeout for ARM calls (seconds)
/// Bounds a single reconciliation even if the ARM endpoint hangs
pub const ARM_REQUEST_TIMEOUT_SECS: u64 = 30;
