//! # PublishingProfile Status
//!
//! Observed-state types. The two lifecycle flags are the persisted form of
//! the fetch state machine; `deleted_virtually` is meaningful only when
//! `profile_gotten` is true.

use serde::{Deserialize, Serialize};

/// Condition type marked by the external client once the profile fetch
/// succeeded
pub const CONDITION_TYPE_AVAILABLE: &str = "Available";

/// Condition type maintained by the reconciliation driver
pub const CONDITION_TYPE_READY: &str = "Ready";

/// Status of the PublishingProfile resource
///
/// Owned exclusively by the controller. `profile_gotten` is permanent: once
/// the one-time fetch succeeded it is never reset, and the profile document
/// is never re-emitted.
#[derive(Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishingProfileStatus {
    /// True once the one-time profile fetch has succeeded
    // Wire key is snake_case for compatibility with existing objects
    #[serde(default, rename = "profile_gotten")]
    pub profile_gotten: bool,
    /// True once deletion was requested. Purely local bookkeeping: the
    /// fetched document cannot be un-fetched, so no provider call is made.
    #[serde(default, rename = "deleted_virtually")]
    pub deleted_virtually: bool,
    /// Conditions represent the latest available observations
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Observed generation
    #[serde(default)]
    pub observed_generation: Option<i64>,
    /// Last reconciliation time (RFC3339)
    #[serde(default)]
    pub last_reconcile_time: Option<String>,
}

impl PublishingProfileStatus {
    /// Insert or replace the condition of the same type.
    ///
    /// The transition timestamp is preserved when only reason/message change
    /// and the status value is unchanged.
    pub fn set_condition(&mut self, condition: Condition) {
        match self
            .conditions
            .iter_mut()
            .find(|existing| existing.r#type == condition.r#type)
        {
            Some(existing) if existing.status == condition.status => {
                existing.reason = condition.reason;
                existing.message = condition.message;
            }
            Some(existing) => *existing = condition,
            None => self.conditions.push(condition),
        }
    }

    /// Look up a condition by type
    #[must_use]
    pub fn condition(&self, r#type: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.r#type == r#type)
    }
}

/// Condition represents a condition of a resource
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition
    pub r#type: String,
    /// Status of the condition (True, False, Unknown)
    pub status: String,
    /// Last transition time
    #[serde(default)]
    pub last_transition_time: Option<String>,
    /// Reason for the condition
    #[serde(default)]
    pub reason: Option<String>,
    /// Message describing the condition
    #[serde(default)]
    pub message: Option<String>,
}

impl Condition {
    fn new(r#type: &str, status: &str, reason: &str, message: Option<String>) -> Self {
        Self {
            r#type: r#type.to_string(),
            status: status.to_string(),
            last_transition_time: Some(chrono::Utc::now().to_rfc3339()),
            reason: Some(reason.to_string()),
            message,
        }
    }

    /// The profile has been fetched and the object is available
    #[must_use]
    pub fn available() -> Self {
        Self::new(CONDITION_TYPE_AVAILABLE, "True", "ProfileFetched", None)
    }

    /// Reconciliation succeeded
    #[must_use]
    pub fn ready() -> Self {
        Self::new(CONDITION_TYPE_READY, "True", "ReconcileSuccess", None)
    }

    /// Reconciliation failed; the wrapped error message is surfaced to users
    #[must_use]
    pub fn not_ready(message: &str) -> Self {
        Self::new(
            CONDITION_TYPE_READY,
            "False",
            "ReconcileError",
            Some(message.to_string()),
        )
    }
}
