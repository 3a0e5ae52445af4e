//! Completion waiting
//!
//! Polls the service until every request targeting an object reaches a
//! terminal status. The wait is bounded by a configurable deadline and can
//! be cancelled cooperatively without affecting the remote requests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use portico_service::ids::ObjectId;
use portico_service::traits::IdentityService;

use crate::config::WaiterConfig;
use crate::error::{RequestError, RequestResult};

/// How a wait ended, short of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// No non-terminal request targets the object any more.
    Completed,
    /// The wait was cancelled through its [`CancelHandle`].
    Cancelled,
}

/// Handle for cancelling an in-flight wait.
///
/// Cancellation is cooperative: the waiter notices the flag between polls.
/// The underlying remote requests keep processing.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// Request cancellation of the wait.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Blocks until all requests targeting an object are terminal.
///
/// An identifier that never had a request returns immediately: no pending
/// requests are found, which is indistinguishable from "already completed".
/// That ambiguity is accepted; callers pass identifiers of requests they
/// actually submitted.
pub struct CompletionWaiter {
    service: Arc<dyn IdentityService>,
    config: WaiterConfig,
    cancelled: Arc<AtomicBool>,
}

impl CompletionWaiter {
    /// Create a waiter with the default configuration.
    pub fn new(service: Arc<dyn IdentityService>) -> Self {
        Self::with_config(service, WaiterConfig::default())
    }

    /// Create a waiter with an explicit configuration.
    pub fn with_config(service: Arc<dyn IdentityService>, config: WaiterConfig) -> Self {
        Self {
            service,
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a handle for cancelling waits on this waiter.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(self.cancelled.clone())
    }

    /// Wait until no non-terminal request targets the given object.
    ///
    /// Polls at the configured interval. Returns
    /// [`RequestError::WaitTimedOut`] when the configured deadline elapses
    /// with requests still outstanding; the remote requests are unaffected.
    pub async fn wait(&self, target: ObjectId) -> RequestResult<WaitOutcome> {
        let started = tokio::time::Instant::now();
        let mut polls: u32 = 0;

        loop {
            if self.cancelled.load(Ordering::Relaxed) {
                warn!(target_id = %target, polls, "completion wait cancelled");
                return Ok(WaitOutcome::Cancelled);
            }

            let snapshots = self.service.pending_requests(target).await?;
            polls += 1;
            let outstanding = snapshots
                .iter()
                .filter(|snapshot| !snapshot.status.is_terminal())
                .count();

            if outstanding == 0 {
                debug!(target_id = %target, polls, "all requests terminal");
                return Ok(WaitOutcome::Completed);
            }

            if let Some(deadline) = self.config.deadline {
                if started.elapsed() >= deadline {
                    return Err(RequestError::WaitTimedOut {
                        target,
                        waited_secs: started.elapsed().as_secs(),
                    });
                }
            }

            debug!(
                target_id = %target,
                outstanding,
                polls,
                interval_secs = self.config.poll_interval.as_secs(),
                "requests still outstanding"
            );
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}
