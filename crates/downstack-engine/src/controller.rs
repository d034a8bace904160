//! Deletion controller
//!
//! The per-resource state machine: queries the current status, applies
//! status-specific policy (skip, wait, retry, delete), and hands off to
//! the status poller. At most one mutating call is issued per successful
//! pass; a deletion that is already in flight is never re-requested.

use crate::cancel::CancelToken;
use crate::clock::Clock;
use crate::poller::{PollOutcome, StatusPoller};
use downstack_core::{ControlPlane, Error, LifecycleStatus, ResourceHandle, Result, RunConfig};

/// Outcome of one controller pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlOutcome {
    /// The resource was already absent; nothing was done.
    SkippedAlreadyAbsent,
    /// Dry run: the intended action was logged, no mutation issued.
    DryRunPreview,
    /// The poller observed the resource absent after this pass acted.
    Deleted,
    /// Deletion could not be completed on this pass.
    Failed { last_status: Option<LifecycleStatus> },
}

/// Drives one resource from its current status toward absent.
pub struct DeletionController<'a> {
    provider: &'a dyn ControlPlane,
    clock: &'a dyn Clock,
    config: &'a RunConfig,
}

impl<'a> DeletionController<'a> {
    pub fn new(provider: &'a dyn ControlPlane, clock: &'a dyn Clock, config: &'a RunConfig) -> Self {
        Self {
            provider,
            clock,
            config,
        }
    }

    /// One full pass: status → (delete request) → poll.
    ///
    /// Errors are transport-level only; every deletion verdict comes back
    /// as a [`ControlOutcome`].
    pub async fn run(&self, handle: &ResourceHandle, cancel: &CancelToken) -> Result<ControlOutcome> {
        let status = self.provider.status(handle).await?;

        if self.config.dry_run {
            let action = match &status {
                LifecycleStatus::Absent => "nothing, already absent",
                s if s.needs_delete_request() => "request deletion",
                _ => "wait for the in-flight deletion",
            };
            tracing::info!(resource = %handle, status = %status, "dry run: would do {action}");
            return Ok(ControlOutcome::DryRunPreview);
        }

        if status == LifecycleStatus::Absent {
            tracing::info!(resource = %handle, "already absent, skipping");
            return Ok(ControlOutcome::SkippedAlreadyAbsent);
        }

        // An accepted deletion is already running; a second request would
        // be rejected or wasted by the provider.
        if !status.needs_delete_request() {
            tracing::info!(resource = %handle, status = %status, "deletion already in flight, waiting");
            return self.await_deletion(handle, cancel).await;
        }

        if !self.request_with_retries(handle, &status).await? {
            return Ok(ControlOutcome::Failed {
                last_status: Some(status),
            });
        }

        self.await_deletion(handle, cancel).await
    }

    /// Issue the delete request, retrying transport rejections with a
    /// fixed backoff. Returns whether the provider accepted the request.
    async fn request_with_retries(
        &self,
        handle: &ResourceHandle,
        status: &LifecycleStatus,
    ) -> Result<bool> {
        let attempts = self.config.max_delete_retries.max(1);
        for attempt in 1..=attempts {
            tracing::info!(
                resource = %handle,
                status = %status,
                attempt,
                "requesting deletion"
            );
            match self.provider.request_delete(handle).await {
                Ok(()) => return Ok(true),
                Err(e) if e.is_retryable() && attempt < attempts => {
                    tracing::warn!(
                        resource = %handle,
                        attempt,
                        error = %e,
                        "delete request not accepted, will retry"
                    );
                    self.clock.sleep(self.config.retry_delay).await;
                }
                Err(e) if e.is_retryable() => {
                    tracing::error!(
                        resource = %handle,
                        attempts,
                        error = %e,
                        "delete request rejected on every attempt; check the provider console"
                    );
                    return Ok(false);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(false)
    }

    async fn await_deletion(
        &self,
        handle: &ResourceHandle,
        cancel: &CancelToken,
    ) -> Result<ControlOutcome> {
        let poller = StatusPoller::new(self.provider, self.clock, self.config);
        match poller.poll(handle, cancel).await? {
            PollOutcome::Absent => Ok(ControlOutcome::Deleted),
            PollOutcome::DeleteFailed => {
                let err = Error::DeleteFailedTerminal {
                    name: handle.name.clone(),
                    last_status: LifecycleStatus::DeleteFailed.to_string(),
                };
                tracing::error!(
                    resource = %handle,
                    error = %err,
                    "check the provider console and retry the teardown"
                );
                Ok(ControlOutcome::Failed {
                    last_status: Some(LifecycleStatus::DeleteFailed),
                })
            }
            PollOutcome::TimedOut { last_status } => Ok(ControlOutcome::Failed {
                last_status: Some(last_status),
            }),
            PollOutcome::Cancelled { last_status } => Ok(ControlOutcome::Failed {
                last_status: Some(last_status),
            }),
        }
    }
}
