//! Downstack core types
//!
//! Shared vocabulary between the teardown engine and the cloud providers:
//! resource handles, lifecycle statuses, run configuration, run reports,
//! and the [`ControlPlane`] trait every provider implements.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 downstack CLI                    │
//! │              (downstack down/status)             │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │              downstack-engine                    │
//! │   controller → poller → verification → report    │
//! └─────────────────┬───────────────────────────────┘
//!                   │ trait ControlPlane (this crate)
//! ┌─────────────────▼───────────────────────────────┐
//! │            downstack-cloud-aws                   │
//! │   CloudFormation / Logs / ECR / SSM / S3 / SM    │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handle;
pub mod provider;
pub mod report;
pub mod status;

// Re-exports
pub use config::RunConfig;
pub use error::{Error, Result};
pub use handle::{ResourceHandle, ResourceKind, SweepKind};
pub use provider::ControlPlane;
pub use report::{Outcome, Phase, ResourceResult, RunReport};
pub use status::LifecycleStatus;
