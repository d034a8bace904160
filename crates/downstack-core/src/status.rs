//! Lifecycle status model
//!
//! Statuses are derived fresh from the control plane on every query and
//! never cached beyond a single check. Provider status strings the engine
//! does not recognize are carried through as [`LifecycleStatus::Unknown`]
//! so new provider states degrade to "still in progress" instead of
//! failing the run.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a resource as reported by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    /// The resource does not exist (the goal state).
    Absent,
    /// The resource exists and is in service.
    Active,
    /// A deletion was accepted but has not started yet.
    DeletePending,
    /// A deletion is underway.
    DeleteInProgress,
    /// The provider accepted a deletion and then failed it.
    DeleteFailed,
    /// Creation failed; the carcass still occupies the name.
    CreateFailed,
    /// A failed creation was rolled back; deletable.
    RollbackComplete,
    /// A failed update was rolled back; deletable.
    UpdateRollbackComplete,
    /// Any provider status string this engine does not model.
    Unknown(String),
}

impl LifecycleStatus {
    /// Map a raw provider status string onto the engine's model.
    ///
    /// The vocabulary follows CloudFormation stack statuses; anything
    /// unrecognized becomes `Unknown` and is treated as in-progress by
    /// the poller.
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "DELETE_COMPLETE" => LifecycleStatus::Absent,
            "CREATE_COMPLETE" | "UPDATE_COMPLETE" => LifecycleStatus::Active,
            "DELETE_PENDING" => LifecycleStatus::DeletePending,
            "DELETE_IN_PROGRESS" => LifecycleStatus::DeleteInProgress,
            "DELETE_FAILED" => LifecycleStatus::DeleteFailed,
            "CREATE_FAILED" => LifecycleStatus::CreateFailed,
            "ROLLBACK_COMPLETE" | "ROLLBACK_FAILED" => LifecycleStatus::RollbackComplete,
            "UPDATE_ROLLBACK_COMPLETE" => LifecycleStatus::UpdateRollbackComplete,
            other => {
                tracing::debug!(raw = other, "unmodeled provider status");
                LifecycleStatus::Unknown(other.to_string())
            }
        }
    }

    /// Terminal for polling purposes: no further status change is coming.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleStatus::Absent | LifecycleStatus::DeleteFailed)
    }

    /// Whether the controller should issue a (new) delete request.
    ///
    /// `DeletePending`/`DeleteInProgress` return false: the provider has
    /// already accepted one deletion and a second request would be
    /// rejected or wasted.
    pub fn needs_delete_request(&self) -> bool {
        match self {
            LifecycleStatus::Absent
            | LifecycleStatus::DeletePending
            | LifecycleStatus::DeleteInProgress => false,
            LifecycleStatus::Active
            | LifecycleStatus::DeleteFailed
            | LifecycleStatus::CreateFailed
            | LifecycleStatus::RollbackComplete
            | LifecycleStatus::UpdateRollbackComplete
            | LifecycleStatus::Unknown(_) => true,
        }
    }
}

impl std::fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleStatus::Absent => write!(f, "absent"),
            LifecycleStatus::Active => write!(f, "active"),
            LifecycleStatus::DeletePending => write!(f, "delete-pending"),
            LifecycleStatus::DeleteInProgress => write!(f, "delete-in-progress"),
            LifecycleStatus::DeleteFailed => write!(f, "delete-failed"),
            LifecycleStatus::CreateFailed => write!(f, "create-failed"),
            LifecycleStatus::RollbackComplete => write!(f, "rollback-complete"),
            LifecycleStatus::UpdateRollbackComplete => write!(f, "update-rollback-complete"),
            LifecycleStatus::Unknown(raw) => write!(f, "unknown({})", raw),
        }
    }
}
