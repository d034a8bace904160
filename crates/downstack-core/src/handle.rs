//! Resource handles
//!
//! A [`ResourceHandle`] is the opaque identity the engine passes to the
//! control plane: a kind plus a provider-visible name. Handles are built
//! once when the registry is assembled and never mutated afterwards.

use serde::{Deserialize, Serialize};

/// Kind of resource a handle points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// An ordered, individually tracked infrastructure stack.
    Stack,
    /// An ancillary resource matched by name/prefix during the sweep phase.
    Sweep(SweepKind),
}

/// Service family of a sweep resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepKind {
    /// Log group (e.g. CloudWatch Logs).
    LogGroup,
    /// Container image repository (e.g. ECR).
    ImageRepository,
    /// Configuration parameter (e.g. SSM Parameter Store).
    Parameter,
    /// Managed secret (e.g. Secrets Manager).
    Secret,
    /// Blob-store objects under a key prefix (e.g. S3).
    BucketPrefix,
}

impl std::fmt::Display for SweepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SweepKind::LogGroup => write!(f, "log-group"),
            SweepKind::ImageRepository => write!(f, "image-repository"),
            SweepKind::Parameter => write!(f, "parameter"),
            SweepKind::Secret => write!(f, "secret"),
            SweepKind::BucketPrefix => write!(f, "bucket-prefix"),
        }
    }
}

/// Identity of one resource for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHandle {
    /// What family of resource this is.
    pub kind: ResourceKind,

    /// Provider-visible name (stack name, log group name, key prefix, ...).
    pub name: String,
}

impl ResourceHandle {
    pub fn stack(name: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::Stack,
            name: name.into(),
        }
    }

    pub fn sweep(kind: SweepKind, name: impl Into<String>) -> Self {
        Self {
            kind: ResourceKind::Sweep(kind),
            name: name.into(),
        }
    }

    /// Human-readable "kind:name" key, used in logs and reports.
    pub fn key(&self) -> String {
        match self.kind {
            ResourceKind::Stack => format!("stack:{}", self.name),
            ResourceKind::Sweep(kind) => format!("{}:{}", kind, self.name),
        }
    }
}

impl std::fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}
