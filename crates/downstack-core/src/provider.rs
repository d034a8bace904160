//! Control-plane trait definition

use crate::error::Result;
use crate::handle::{ResourceHandle, SweepKind};
use crate::status::LifecycleStatus;
use async_trait::async_trait;

/// Provider abstraction for resource lifecycle state.
///
/// Every backend (AWS, test mocks, ...) implements this trait to give the
/// engine a uniform view of "what state is this resource in" and "ask the
/// provider to delete it". All methods except [`ControlPlane::request_delete`]
/// are side-effect-free reads.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Returns the provider name (e.g. "aws").
    fn name(&self) -> &str;

    /// Current lifecycle status of a resource.
    ///
    /// Returns [`LifecycleStatus::Absent`] for a resource that does not
    /// exist — never an error. Transport failures (auth, throttling,
    /// network) are errors and must not be conflated with absence.
    async fn status(&self, handle: &ResourceHandle) -> Result<LifecycleStatus>;

    /// Whether the resource currently exists.
    async fn exists(&self, handle: &ResourceHandle) -> Result<bool> {
        Ok(self.status(handle).await? != LifecycleStatus::Absent)
    }

    /// Ask the provider to delete the resource. Acceptance only: the
    /// actual deletion is asynchronous and observed through [`Self::status`].
    async fn request_delete(&self, handle: &ResourceHandle) -> Result<()>;

    /// Enumerate sweep resources of `kind` whose names start with `prefix`.
    async fn list(&self, kind: SweepKind, prefix: &str) -> Result<Vec<String>>;
}
