//! Background dissection off the caller's thread.
//!
//! Each request runs on tokio's blocking pool, bounded by a timeout. A new
//! request cancels the one in flight; a request that finishes after being
//! replaced resolves to [`DissectError::Superseded`] so a stale tree is
//! never delivered.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use tracing::debug;

use crate::config::WorkerConfig;
use crate::core::DisplayNode;
use crate::dissect::DissectorRef;
use crate::error::{DissectError, MalformedInputError, Result};
use crate::log_error;
use crate::project::project;
use crate::timeout::{with_timeout, CancelToken, TimeoutConfig};

/// Projected tree of one completed request.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundTree {
    /// Request generation; compare with [`DissectionWorker::is_current`].
    pub generation: u64,
    pub nodes: Vec<DisplayNode>,
}

/// Runs dissections asynchronously, newest request wins.
pub struct DissectionWorker {
    timeout: Duration,
    generation: AtomicU64,
    in_flight: Mutex<Option<CancelToken>>,
}

impl DissectionWorker {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(None),
        }
    }

    pub fn from_config(config: &WorkerConfig) -> Self {
        Self::new(Duration::from_secs(config.timeout_seconds))
    }

    /// Generation of the most recent request or invalidation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// True when nothing newer has been requested since `generation`.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation() == generation
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, Option<CancelToken>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cancels the running request and marks every earlier result stale.
    pub fn cancel_current(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        if let Some(token) = self.lock_in_flight().take() {
            debug!("Cancelling in-flight dissection");
            token.cancel();
        }
    }

    /// Clears the in-flight slot if it still holds `token`.
    fn finish(&self, token: &CancelToken) {
        let mut slot = self.lock_in_flight();
        if slot.as_ref().is_some_and(|t| t.same_as(token)) {
            *slot = None;
        }
    }

    /// Dissects `data` with `dissector` and projects the result.
    ///
    /// An empty buffer is never handed to the dissector; it yields an empty tree.
    pub async fn dissect(&self, dissector: DissectorRef, data: Bytes) -> Result<BackgroundTree> {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let token = CancelToken::new();
        if let Some(previous) = self.lock_in_flight().replace(token.clone()) {
            debug!(generation, "Cancelling superseded dissection");
            previous.cancel();
        }

        if data.is_empty() {
            self.finish(&token);
            return Ok(BackgroundTree {
                generation,
                nodes: Vec::new(),
            });
        }

        let name = dissector.name().to_string();
        let job_token = token.clone();
        let job = async move {
            let handle = tokio::task::spawn_blocking(move || {
                dissector
                    .dissect_cancellable(&data, &job_token)
                    .map(|value| project(&value))
            });
            match handle.await {
                Ok(result) => result,
                Err(e) if e.is_panic() => Err(MalformedInputError::new(
                    name,
                    "dissector panicked on this input",
                )
                .into()),
                Err(e) => Err(DissectError::Internal(format!("dissection task failed: {}", e))),
            }
        };

        let config = TimeoutConfig::from_duration(self.timeout, format!("dissect#{}", generation));
        let result = with_timeout(config, job).await;
        if matches!(result, Err(DissectError::Timeout { .. })) {
            // Stop the blocking task at its next check.
            token.cancel();
        }
        self.finish(&token);

        if !self.is_current(generation) {
            return Err(DissectError::Superseded);
        }
        result
            .map(|nodes| BackgroundTree { generation, nodes })
            .map_err(|e| log_error!(e, "background dissection"))
    }
}

impl Default for DissectionWorker {
    fn default() -> Self {
        Self::from_config(&WorkerConfig::default())
    }
}
