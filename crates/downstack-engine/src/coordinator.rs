//! Run coordinator
//!
//! Walks the registry: ordered stacks strictly sequentially (controller →
//! poller → verification per stack), then the sweep phase, where every
//! matched resource is processed independently and failures are captured
//! locally. Nothing a single resource does can abort the run; only the
//! aggregated report's exit-code verdict reflects partial failure.

use crate::cancel::CancelToken;
use crate::clock::Clock;
use crate::registry::{Registry, SweepEntry};
use crate::verify::VerificationLoop;
use downstack_core::{
    ControlPlane, Outcome, Phase, ResourceHandle, ResourceKind, ResourceResult, RunConfig,
    RunReport,
};
use std::sync::Arc;

/// Owns one teardown run end to end.
pub struct Coordinator {
    provider: Arc<dyn ControlPlane>,
    clock: Arc<dyn Clock>,
    config: RunConfig,
    cancel: CancelToken,
}

impl Coordinator {
    pub fn new(
        provider: Arc<dyn ControlPlane>,
        clock: Arc<dyn Clock>,
        config: RunConfig,
        cancel: CancelToken,
    ) -> Self {
        Self {
            provider,
            clock,
            config,
            cancel,
        }
    }

    /// Tear down everything in the registry and report per-resource
    /// outcomes. Never returns an error: per-resource failures land in
    /// the report.
    pub async fn run(&self, registry: &Registry) -> RunReport {
        let mut report = RunReport::new(self.config.dry_run);

        tracing::info!(
            provider = self.provider.name(),
            stacks = registry.stacks().len(),
            sweeps = registry.sweeps().len(),
            dry_run = self.config.dry_run,
            "starting teardown run"
        );

        for entry in registry.stacks() {
            if self.cancel.is_cancelled() {
                tracing::warn!(
                    stack = %entry.name,
                    "cancellation requested, not starting further stacks"
                );
                break;
            }

            tracing::info!(stack = %entry.name, layer = %entry.layer, "processing stack");
            let handle = entry.handle();
            let settled = self.settle(&handle).await;
            report.record(ResourceResult {
                name: entry.name.clone(),
                kind: handle.kind,
                phase: Phase::Ordered,
                outcome: settled.outcome,
                attempts_used: settled.attempts_used,
                last_status: settled.last_status,
            });
        }

        for sweep in registry.sweeps() {
            if self.cancel.is_cancelled() {
                tracing::warn!("cancellation requested, skipping remaining sweep patterns");
                break;
            }
            self.sweep(sweep, &mut report).await;
        }

        report.finish();
        tracing::info!(summary = %report, "teardown run finished");
        report
    }

    async fn settle(&self, handle: &ResourceHandle) -> crate::verify::Settled {
        VerificationLoop::new(self.provider.as_ref(), self.clock.as_ref(), &self.config)
            .settle(handle, &self.cancel)
            .await
    }

    /// One sweep pattern: enumerate matches, tear each down independently.
    /// A failing item is recorded and logged, never fatal to its siblings.
    async fn sweep(&self, entry: &SweepEntry, report: &mut RunReport) {
        tracing::info!(kind = %entry.kind, prefix = %entry.prefix, "sweeping");

        let names = match self.provider.list(entry.kind, &entry.prefix).await {
            Ok(names) => names,
            Err(e) => {
                tracing::error!(
                    kind = %entry.kind,
                    prefix = %entry.prefix,
                    error = %e,
                    "could not enumerate sweep resources; check the provider console"
                );
                report.record(ResourceResult {
                    name: entry.prefix.clone(),
                    kind: ResourceKind::Sweep(entry.kind),
                    phase: Phase::Sweep,
                    outcome: Outcome::Failed,
                    attempts_used: 0,
                    last_status: None,
                });
                return;
            }
        };

        if names.is_empty() {
            tracing::debug!(kind = %entry.kind, prefix = %entry.prefix, "no matches");
            return;
        }

        for name in names {
            if self.cancel.is_cancelled() {
                tracing::warn!(kind = %entry.kind, "cancellation requested, stopping sweep");
                return;
            }

            let handle = ResourceHandle::sweep(entry.kind, &name);
            let settled = self.settle(&handle).await;
            if settled.outcome == Outcome::Failed {
                tracing::warn!(
                    resource = %handle,
                    "sweep item failed; continuing with remaining items"
                );
            }
            report.record(ResourceResult {
                name,
                kind: handle.kind,
                phase: Phase::Sweep,
                outcome: settled.outcome,
                attempts_used: settled.attempts_used,
                last_status: settled.last_status,
            });
        }
    }
}
