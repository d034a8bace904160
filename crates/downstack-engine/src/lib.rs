//! Downstack teardown engine
//!
//! Drives an ordered list of infrastructure stacks, then a sweep of
//! loosely coupled ancillary resources, toward "absent". The engine owns
//! no state between runs: everything is re-derived from the control plane
//! on every invocation.
//!
//! The moving parts, leaves first:
//!
//! - [`clock::Clock`] — injectable time source so retry/poll loops are
//!   deterministic under test.
//! - [`poller::StatusPoller`] — sleep/recheck until a terminal status or
//!   the poll budget runs out.
//! - [`controller::DeletionController`] — per-resource state machine that
//!   issues at most one delete request per pass.
//! - [`verify::VerificationLoop`] — re-checks absence and re-runs the
//!   controller for resources that linger or reappear.
//! - [`registry::Registry`] — the fixed-order stack list plus the sweep
//!   prefixes.
//! - [`coordinator::Coordinator`] — walks the registry and aggregates the
//!   [`downstack_core::RunReport`].

pub mod cancel;
pub mod clock;
pub mod controller;
pub mod coordinator;
pub mod poller;
pub mod registry;
pub mod verify;

// Re-exports
pub use cancel::CancelToken;
pub use clock::{Clock, SystemClock};
pub use controller::{ControlOutcome, DeletionController};
pub use coordinator::Coordinator;
pub use poller::{PollOutcome, StatusPoller};
pub use registry::{Registry, StackEntry, SweepEntry};
pub use verify::{Settled, VerificationLoop};
