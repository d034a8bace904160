//! Status poller
//!
//! Re-queries a resource's lifecycle status until it reaches a terminal
//! state or the poll budget elapses. Statuses the engine does not model
//! are logged and treated as "still in progress" — new provider status
//! strings must not fail a run.

use crate::cancel::CancelToken;
use crate::clock::Clock;
use downstack_core::{ControlPlane, LifecycleStatus, ResourceHandle, Result, RunConfig};
use std::time::Duration;

/// Why a poll loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The resource is gone.
    Absent,
    /// The provider reported the deletion failed.
    DeleteFailed,
    /// The poll budget elapsed; the resource may still be deleting.
    TimedOut { last_status: LifecycleStatus },
    /// Cancellation was requested after a completed recheck cycle.
    Cancelled { last_status: LifecycleStatus },
}

/// Polls one resource toward a terminal status.
pub struct StatusPoller<'a> {
    provider: &'a dyn ControlPlane,
    clock: &'a dyn Clock,
    config: &'a RunConfig,
}

impl<'a> StatusPoller<'a> {
    pub fn new(provider: &'a dyn ControlPlane, clock: &'a dyn Clock, config: &'a RunConfig) -> Self {
        Self {
            provider,
            clock,
            config,
        }
    }

    /// Poll until `Absent`, `DeleteFailed`, timeout, or cancellation.
    ///
    /// Transport errors from the status query propagate to the caller;
    /// they are a property of the call, not a deletion verdict.
    pub async fn poll(&self, handle: &ResourceHandle, cancel: &CancelToken) -> Result<PollOutcome> {
        let mut elapsed = Duration::ZERO;

        loop {
            let status = self.provider.status(handle).await?;
            match status {
                LifecycleStatus::Absent => {
                    tracing::info!(resource = %handle, "deletion confirmed, resource is absent");
                    return Ok(PollOutcome::Absent);
                }
                LifecycleStatus::DeleteFailed => {
                    tracing::warn!(
                        resource = %handle,
                        "provider reports delete-failed; manual intervention may be required"
                    );
                    return Ok(PollOutcome::DeleteFailed);
                }
                ref other => {
                    tracing::debug!(resource = %handle, status = %other, "still deleting");
                }
            }

            if elapsed >= self.config.max_poll {
                tracing::warn!(
                    resource = %handle,
                    last_status = %status,
                    elapsed_secs = elapsed.as_secs(),
                    "poll budget exhausted; resource may still be deleting"
                );
                return Ok(PollOutcome::TimedOut { last_status: status });
            }

            if cancel.is_cancelled() {
                tracing::info!(resource = %handle, "cancellation requested, stopping poll");
                return Ok(PollOutcome::Cancelled { last_status: status });
            }

            self.clock.sleep(self.config.poll_interval).await;
            elapsed += self.config.poll_interval.max(Duration::from_secs(1));
        }
    }
}
