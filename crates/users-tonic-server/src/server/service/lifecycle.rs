//! Admission control and graceful shutdown for in-flight calls.
//!
//! Every call is admitted through [`Lifecycle::admit`], which hands back a
//! [`CallGuard`] that keeps the call counted as in flight until it is
//! dropped. Streaming calls move their guard into the feeder task, so the
//! count covers the whole life of the stream rather than just the handler.
//!
//! Shutdown runs in phases:
//!
//! 1. Refuse new calls with [`Error::ServiceShutdown`].
//! 2. Wait up to the configured timeout for in-flight calls to drain.
//! 3. Cancel the shared [`CancellationToken`] so remaining feeders stop.

use crate::server::{
    service::call::Call,
    telemetry::{decrement_streams_inflight, increment_requests, increment_streams_inflight},
};
use core::time::Duration;
use portable_atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use users_tonic_core::{Error, Result};

#[derive(Debug)]
pub struct Lifecycle {
    shutting_down: AtomicBool,
    inflight: AtomicUsize,
    shutdown_token: CancellationToken,
    shutdown_timeout: Duration,
}

impl Lifecycle {
    pub fn new(shutdown_timeout: Duration) -> Self {
        Self {
            shutting_down: AtomicBool::new(false),
            inflight: AtomicUsize::new(0),
            shutdown_token: CancellationToken::new(),
            shutdown_timeout,
        }
    }

    /// Registers a new `call` as in flight.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServiceShutdown`] once shutdown has begun.
    pub fn admit(self: &Arc<Self>, call: Call) -> Result<CallGuard> {
        if self.shutting_down.load(Ordering::Acquire) {
            tracing::debug!(call = call.name(), "refusing call during shutdown");
            return Err(Error::ServiceShutdown);
        }

        self.inflight.fetch_add(1, Ordering::AcqRel);
        increment_requests(call);
        if call.is_streaming() {
            increment_streams_inflight();
        }
        tracing::trace!(call = call.name(), shape = call.shape().as_str(), "call admitted");

        Ok(CallGuard {
            lifecycle: Arc::clone(self),
            call,
        })
    }

    /// A token cancelled when shutdown gives up waiting on in-flight calls.
    pub fn cancellation(&self) -> CancellationToken {
        self.shutdown_token.child_token()
    }

    pub fn inflight(&self) -> usize {
        self.inflight.load(Ordering::Acquire)
    }

    /// Stops admitting calls, drains in-flight ones, then cancels whatever
    /// is left.
    pub async fn shutdown(&self) {
        // === Phase 1: Stop accepting new calls ===
        tracing::info!("Refusing new calls");
        self.shutting_down.store(true, Ordering::Release);

        // === Phase 2: Wait for in-flight calls to drain ===
        tracing::info!("Draining in-flight calls ({} active)", self.inflight());
        let drained = timeout(self.shutdown_timeout, async {
            while self.inflight() > 0 {
                sleep(Duration::from_millis(50)).await;
            }
        })
        .await;

        match drained {
            Ok(()) => tracing::debug!("All in-flight calls drained"),
            Err(_) => tracing::warn!(
                "Graceful drain timed out ({} calls still active)",
                self.inflight()
            ),
        }

        // === Phase 3: Cancel remaining work ===
        tracing::debug!("Cancelling remaining work via shutdown token");
        self.shutdown_token.cancel();
    }
}

/// Keeps one call counted as in flight until dropped.
#[derive(Debug)]
pub struct CallGuard {
    lifecycle: Arc<Lifecycle>,
    call: Call,
}

impl Drop for CallGuard {
    fn drop(&mut self) {
        self.lifecycle.inflight.fetch_sub(1, Ordering::AcqRel);
        if self.call.is_streaming() {
            decrement_streams_inflight();
        }
    }
}
