//! Injectable time source
//!
//! Retry and poll loops sleep through this trait instead of calling
//! `tokio::time::sleep` directly, so tests can run the whole engine
//! without real delays.

use async_trait::async_trait;
use std::time::Duration;

/// Time source for the engine's sleep-then-recheck loops.
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production clock backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}
