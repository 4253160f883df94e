// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Admission control for sandboxed runs.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::warn;

use crate::config::SandboxSettings;
use crate::error::SandboxError;
#[cfg(feature = "telemetry")]
use crate::telemetry::metrics::{record_run, RunOutcome};

/// Caps concurrent runs; callers beyond the cap wait a bounded time.
#[derive(Debug, Clone)]
pub struct RunLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    queue_timeout: Duration,
}

/// A run slot, released on drop.
#[derive(Debug)]
pub struct RunPermit {
    _permit: OwnedSemaphorePermit,
}

impl RunLimiter {
    pub fn new(capacity: usize, queue_timeout: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            queue_timeout,
        }
    }

    pub fn from_settings(settings: &SandboxSettings) -> Self {
        Self::new(settings.max_concurrent_runs, settings.queue_timeout())
    }

    /// Wait for a slot, failing with [`SandboxError::Busy`] once the queue
    /// timeout passes.
    pub async fn acquire(&self) -> Result<RunPermit, SandboxError> {
        let acquire = Arc::clone(&self.semaphore).acquire_owned();
        match tokio::time::timeout(self.queue_timeout, acquire).await {
            Ok(Ok(permit)) => Ok(RunPermit { _permit: permit }),
            Ok(Err(_)) => Err(SandboxError::Setup("run limiter closed".to_string())),
            Err(_) => {
                let active = self.active();
                warn!(active, capacity = self.capacity, "Run rejected, server busy");
                #[cfg(feature = "telemetry")]
                record_run(RunOutcome::Rejected, false);
                Err(SandboxError::Busy { active })
            }
        }
    }

    /// Runs currently holding a slot.
    pub fn active(&self) -> usize {
        self.capacity.saturating_sub(self.semaphore.available_permits())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn queue_timeout(&self) -> Duration {
        self.queue_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_permits_are_counted() {
        let limiter = RunLimiter::new(2, Duration::from_millis(10));
        let first = limiter.acquire().await.unwrap();
        assert_eq!(limiter.active(), 1);
        let _second = limiter.acquire().await.unwrap();
        assert_eq!(limiter.active(), 2);
        drop(first);
        assert_eq!(limiter.active(), 1);
    }

    #[tokio::test]
    async fn test_busy_after_queue_timeout() {
        let limiter = RunLimiter::new(1, Duration::from_millis(20));
        let _held = limiter.acquire().await.unwrap();
        let err = limiter.acquire().await.unwrap_err();
        assert!(matches!(err, SandboxError::Busy { active: 1 }));
    }

    #[tokio::test]
    async fn test_waiter_gets_released_slot() {
        let limiter = RunLimiter::new(1, Duration::from_secs(2));
        let held = limiter.acquire().await.unwrap();
        let waiter = {
            let limiter = limiter.clone();
            tokio::spawn(async move { limiter.acquire().await.map(|_| ()) })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(held);
        assert!(waiter.await.unwrap().is_ok());
    }
}
