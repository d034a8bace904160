//! Run outcomes and the aggregate report
//!
//! The engine records one [`ResourceResult`] per resource and never claims
//! `Deleted` without a re-check showing the resource absent.

use crate::handle::ResourceKind;
use crate::status::LifecycleStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Terminal outcome for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Verified absent after this run acted on it.
    Deleted,
    /// Still present (or deletion failed) after all attempts.
    Failed,
    /// Already absent at first query; nothing was done.
    SkippedAlreadyAbsent,
    /// Dry run: the mutation was logged, not issued.
    DryRunPreview,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Deleted => write!(f, "deleted"),
            Outcome::Failed => write!(f, "failed"),
            Outcome::SkippedAlreadyAbsent => write!(f, "skipped (already absent)"),
            Outcome::DryRunPreview => write!(f, "dry-run preview"),
        }
    }
}

/// Which phase of the run produced a result.
///
/// Only ordered-phase failures affect the process exit code; sweep
/// failures are logged and carried in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Ordered,
    Sweep,
}

/// Result for a single resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceResult {
    /// Provider-visible resource name.
    pub name: String,

    /// Resource kind.
    pub kind: ResourceKind,

    /// Ordered stack or sweep item.
    pub phase: Phase,

    /// Terminal outcome.
    pub outcome: Outcome,

    /// Controller invocations spent on this resource.
    pub attempts_used: u32,

    /// Last status observed before the outcome was recorded.
    pub last_status: Option<LifecycleStatus>,
}

/// Aggregate report for a whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub dry_run: bool,
    pub results: Vec<ResourceResult>,
}

impl RunReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            dry_run,
            results: Vec::new(),
        }
    }

    pub fn record(&mut self, result: ResourceResult) {
        self.results.push(result);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// True when no ordered resource ended `Failed`. Sweep failures do
    /// not count against success.
    pub fn is_success(&self) -> bool {
        !self
            .results
            .iter()
            .any(|r| r.phase == Phase::Ordered && r.outcome == Outcome::Failed)
    }

    pub fn outcomes(&self, outcome: Outcome) -> impl Iterator<Item = &ResourceResult> {
        self.results.iter().filter(move |r| r.outcome == outcome)
    }

    /// Ordered-phase failures, the ones that drive the exit code.
    pub fn ordered_failures(&self) -> Vec<&ResourceResult> {
        self.results
            .iter()
            .filter(|r| r.phase == Phase::Ordered && r.outcome == Outcome::Failed)
            .collect()
    }
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let deleted = self.outcomes(Outcome::Deleted).count();
        let skipped = self.outcomes(Outcome::SkippedAlreadyAbsent).count();
        let previewed = self.outcomes(Outcome::DryRunPreview).count();
        let failed = self.outcomes(Outcome::Failed).count();
        write!(
            f,
            "{} deleted, {} already absent, {} previewed, {} failed",
            deleted, skipped, previewed, failed
        )
    }
}
