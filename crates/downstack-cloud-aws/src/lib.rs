//! AWS control plane for downstack
//!
//! Implements [`downstack_core::ControlPlane`] on top of the AWS SDK:
//! ordered stacks map to CloudFormation, sweep resources map to
//! CloudWatch Logs, ECR, SSM Parameter Store, Secrets Manager, and S3
//! object prefixes. This crate only reads and deletes — it never creates
//! or mutates stack contents.

pub mod error;
pub mod provider;

// Re-exports
pub use provider::{AwsControlPlane, ConnectOptions};
