//! Run configuration
//!
//! One [`RunConfig`] is constructed per invocation and passed by reference
//! to every component; there is no ambient or global configuration.

use std::time::Duration;

/// Knobs for one teardown run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Preview mode: perform every read, log every intended mutation,
    /// issue none of them.
    pub dry_run: bool,

    /// Skip interactive confirmation (CLI concern, carried here so the
    /// engine can log it).
    pub force: bool,

    /// Delete-request attempts before a resource is marked failed.
    pub max_delete_retries: u32,

    /// Fixed delay between delete-request attempts.
    pub retry_delay: Duration,

    /// Upper bound on total polling time per resource.
    pub max_poll: Duration,

    /// Delay between status polls.
    pub poll_interval: Duration,

    /// Full controller re-runs allowed when a resource survives deletion.
    pub max_verification_attempts: u32,

    /// Delay between verification attempts.
    pub verification_delay: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            force: false,
            max_delete_retries: 3,
            retry_delay: Duration::from_secs(10),
            max_poll: Duration::from_secs(1800),
            poll_interval: Duration::from_secs(15),
            max_verification_attempts: 3,
            verification_delay: Duration::from_secs(10),
        }
    }
}

impl RunConfig {
    /// Configuration with all delays zeroed, for deterministic tests.
    pub fn immediate() -> Self {
        Self {
            retry_delay: Duration::ZERO,
            poll_interval: Duration::ZERO,
            verification_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}
