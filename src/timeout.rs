//! Timeout and cancellation utilities for dissection.
//!
//! The background worker bounds a dissection in wall-clock time with
//! `with_timeout`. Record loops stop cooperatively through `IterationGuard`
//! once the shared `CancelToken` is cancelled, either because a newer
//! request superseded them or because the deadline passed.

use crate::error::{DissectError, Result};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error};

/// Default timeout duration in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// Shared flag a caller flips to stop a dissection in progress.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// True when both handles share one flag.
    pub fn same_as(&self, other: &CancelToken) -> bool {
        Arc::ptr_eq(&self.cancelled, &other.cancelled)
    }

    /// Returns `DissectError::Cancelled` once the token has been cancelled.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(DissectError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Timeout configuration for a dissection job
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    pub duration: Duration,
    /// Operation name for logging
    pub operation_name: String,
}

impl TimeoutConfig {
    pub fn from_duration(duration: Duration, operation: impl Into<String>) -> Self {
        Self {
            duration,
            operation_name: operation.into(),
        }
    }
}

/// Execute an async operation with a timeout
pub async fn with_timeout<T, F>(config: TimeoutConfig, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    debug!(
        "Starting operation '{}' with timeout of {:?}",
        config.operation_name, config.duration
    );

    match timeout(config.duration, future).await {
        Ok(result) => result,
        Err(_) => {
            error!(
                "Operation '{}' timed out after {:?}",
                config.operation_name, config.duration
            );
            Err(DissectError::Timeout {
                seconds: config.duration.as_secs(),
            })
        }
    }
}

/// Periodic cancellation check for record loops.
pub struct IterationGuard {
    check_interval: usize,
    iteration_count: usize,
    cancel: Option<CancelToken>,
    operation_name: String,
}

impl IterationGuard {
    /// A guard that checks every 256 iterations and never stops on its own.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            check_interval: 256,
            iteration_count: 0,
            cancel: None,
            operation_name: operation.into(),
        }
    }

    pub fn with_check_interval(mut self, interval: usize) -> Self {
        self.check_interval = interval.max(1);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Call once per iteration; only every `check_interval`-th call looks at the token.
    pub fn check(&mut self) -> Result<()> {
        self.iteration_count += 1;
        if self.iteration_count % self.check_interval != 0 {
            return Ok(());
        }
        match &self.cancel {
            Some(cancel) if cancel.is_cancelled() => {
                debug!(
                    "Operation '{}' cancelled after {} iterations",
                    self.operation_name, self.iteration_count
                );
                Err(DissectError::Cancelled)
            }
            _ => Ok(()),
        }
    }
}

/// Macro for adding cancellation checks to loops
#[macro_export]
macro_rules! check_cancelled {
    ($guard:expr) => {
        $guard.check()?
    };
    ($guard:expr, $msg:expr) => {
        $guard.check().map_err(|e| {
            tracing::debug!("Stopped in {}: {}", $msg, e);
            e
        })?
    };
}
