//! Error taxonomy
//!
//! "Not found" is deliberately not an error anywhere in this crate: a
//! missing resource is the success condition of a teardown and surfaces
//! as [`crate::LifecycleStatus::Absent`] instead.

use thiserror::Error;

/// Errors crossing the control-plane boundary.
#[derive(Error, Debug)]
pub enum Error {
    /// Auth failure, throttling, network trouble — anything that is a
    /// property of the call rather than the resource. Retried.
    #[error("transport error: {0}")]
    Transport(String),

    /// The provider refused a delete request outright.
    #[error("delete rejected for {name}: {reason}")]
    DeleteRejected { name: String, reason: String },

    /// The provider accepted a deletion and then reported failure.
    /// Not retried automatically; a fresh delete attempt is required.
    #[error("deletion of {name} failed terminally (last status: {last_status})")]
    DeleteFailedTerminal { name: String, last_status: String },

    /// Polling exceeded the configured bound; the resource may still be
    /// deleting on the provider side.
    #[error("timed out after {elapsed_secs}s waiting for {name} to become absent")]
    Timeout { name: String, elapsed_secs: u64 },

    /// Bad CLI arguments or provider construction input.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Transport-level problems are the only errors worth retrying a
    /// delete request over.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::DeleteRejected { .. })
    }
}
