//! Verification loop
//!
//! A controller pass ending in "deleted" is not taken at face value: some
//! providers acknowledge deletion before the resource is truly gone, and
//! managed sub-resources can transiently reappear during teardown of
//! their parent. This loop re-checks existence and re-runs the full
//! controller flow a bounded number of times before giving up.

use crate::cancel::CancelToken;
use crate::clock::Clock;
use crate::controller::{ControlOutcome, DeletionController};
use downstack_core::{ControlPlane, LifecycleStatus, Outcome, ResourceHandle, RunConfig};

/// Final verdict for one resource, with the attempts spent on it.
#[derive(Debug, Clone)]
pub struct Settled {
    pub outcome: Outcome,
    pub attempts_used: u32,
    pub last_status: Option<LifecycleStatus>,
}

/// Runs the controller until the resource is verified absent or the
/// verification budget is spent.
pub struct VerificationLoop<'a> {
    provider: &'a dyn ControlPlane,
    clock: &'a dyn Clock,
    config: &'a RunConfig,
}

impl<'a> VerificationLoop<'a> {
    pub fn new(provider: &'a dyn ControlPlane, clock: &'a dyn Clock, config: &'a RunConfig) -> Self {
        Self {
            provider,
            clock,
            config,
        }
    }

    /// Drive `handle` to a verified terminal outcome.
    ///
    /// Per-resource errors are captured here: whatever happens to this
    /// resource, the caller gets a [`Settled`] and the run moves on.
    pub async fn settle(&self, handle: &ResourceHandle, cancel: &CancelToken) -> Settled {
        let controller = DeletionController::new(self.provider, self.clock, self.config);
        let mut attempts: u32 = 0;
        let mut already_absent = false;

        loop {
            attempts += 1;
            let outcome = match controller.run(handle, cancel).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(
                        resource = %handle,
                        error = %e,
                        "teardown pass failed; check the provider console"
                    );
                    return Settled {
                        outcome: Outcome::Failed,
                        attempts_used: attempts,
                        last_status: None,
                    };
                }
            };

            match outcome {
                ControlOutcome::DryRunPreview => {
                    return Settled {
                        outcome: Outcome::DryRunPreview,
                        attempts_used: attempts,
                        last_status: None,
                    };
                }
                ControlOutcome::Failed { last_status } => {
                    return Settled {
                        outcome: Outcome::Failed,
                        attempts_used: attempts,
                        last_status,
                    };
                }
                ControlOutcome::SkippedAlreadyAbsent => {
                    if attempts == 1 {
                        already_absent = true;
                    }
                }
                ControlOutcome::Deleted => {
                    already_absent = false;
                }
            }

            // The explicit re-check: success is only ever reported off the
            // back of an existence query coming up empty.
            match self.provider.exists(handle).await {
                Ok(false) => {
                    let outcome = if already_absent {
                        Outcome::SkippedAlreadyAbsent
                    } else {
                        Outcome::Deleted
                    };
                    return Settled {
                        outcome,
                        attempts_used: attempts,
                        last_status: Some(LifecycleStatus::Absent),
                    };
                }
                Ok(true) => {
                    tracing::warn!(
                        resource = %handle,
                        attempts,
                        "resource still present after deletion pass"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        resource = %handle,
                        error = %e,
                        "existence re-check failed; check the provider console"
                    );
                    return Settled {
                        outcome: Outcome::Failed,
                        attempts_used: attempts,
                        last_status: None,
                    };
                }
            }

            if attempts > self.config.max_verification_attempts {
                tracing::error!(
                    resource = %handle,
                    attempts,
                    "still present after all verification attempts; check the provider console"
                );
                return Settled {
                    outcome: Outcome::Failed,
                    attempts_used: attempts,
                    last_status: None,
                };
            }

            if cancel.is_cancelled() {
                tracing::info!(resource = %handle, "cancellation requested, not re-verifying");
                return Settled {
                    outcome: Outcome::Failed,
                    attempts_used: attempts,
                    last_status: None,
                };
            }

            self.clock.sleep(self.config.verification_delay).await;
        }
    }
}
