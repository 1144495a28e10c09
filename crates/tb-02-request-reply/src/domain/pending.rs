//! Pending Request Store - correlation id to suspended caller.
//!
//! Flow:
//! 1. `send()` generates (or receives) a correlation id
//! 2. `send()` calls `register()` and keeps the oneshot receiver
//! 3. `send()` publishes the task
//! 4. The reply listener calls `complete()` with the reply envelope
//! 5. `send()` awaits the receiver or its deadline fires (`timed_out()`)
//!
//! Every path out of a pending request removes its entry, so at most one
//! resolution happens per correlation id.

use super::error::PendingError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use shared_types::ReplyEnvelope;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// A caller waiting for its reply.
struct PendingRequest {
    /// Channel to hand the reply to
    sender: oneshot::Sender<ReplyEnvelope>,
    /// When the request was registered
    created_at: Instant,
    /// Task type (for logging)
    task_type: String,
    /// Caller's deadline
    timeout: Duration,
}

/// Statistics for the pending request store
#[derive(Debug, Default)]
pub struct PendingStats {
    /// Total requests registered
    pub total_registered: AtomicU64,
    /// Total requests resolved by a reply
    pub total_completed: AtomicU64,
    /// Total requests whose deadline elapsed
    pub total_timeouts: AtomicU64,
    /// Total requests abandoned (caller dropped, listener stopped)
    pub total_cancelled: AtomicU64,
    /// Replies with no matching pending request
    pub total_unmatched: AtomicU64,
}

/// Pending request table owned by one request/reply client.
#[derive(Default)]
pub struct PendingRequestStore {
    pending: DashMap<String, PendingRequest>,
    stats: Arc<PendingStats>,
}

impl PendingRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pending request and get a receiver for its reply.
    ///
    /// Fails if `correlation_id` is already outstanding.
    pub fn register(
        &self,
        correlation_id: &str,
        task_type: &str,
        timeout: Duration,
    ) -> Result<oneshot::Receiver<ReplyEnvelope>, PendingError> {
        let (tx, rx) = oneshot::channel();

        match self.pending.entry(correlation_id.to_string()) {
            Entry::Occupied(_) => {
                return Err(PendingError::DuplicateCorrelationId(
                    correlation_id.to_string(),
                ))
            }
            Entry::Vacant(slot) => {
                slot.insert(PendingRequest {
                    sender: tx,
                    created_at: Instant::now(),
                    task_type: task_type.to_string(),
                    timeout,
                });
            }
        }
        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);

        debug!(
            correlation_id = correlation_id,
            task_type = task_type,
            "Registered pending request"
        );

        Ok(rx)
    }

    /// Resolve the pending request matching `envelope.correlation_id`.
    ///
    /// Returns true if a waiting caller received the envelope. Unknown ids
    /// (late replies, foreign replies) are logged and dropped.
    pub fn complete(&self, envelope: ReplyEnvelope) -> bool {
        let Some((correlation_id, pending)) = self.pending.remove(&envelope.correlation_id) else {
            self.stats.total_unmatched.fetch_add(1, Ordering::Relaxed);
            warn!(
                correlation_id = %envelope.correlation_id,
                "No matching pending request for reply; it may be late or unexpected"
            );
            return false;
        };

        let response_time = pending.created_at.elapsed();
        match pending.sender.send(envelope) {
            Ok(()) => {
                self.stats.total_completed.fetch_add(1, Ordering::Relaxed);
                debug!(
                    correlation_id = %correlation_id,
                    task_type = pending.task_type,
                    response_time_ms = response_time.as_millis(),
                    "Completed pending request"
                );
                true
            }
            Err(_) => {
                // Receiver was dropped (caller gave up)
                self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
                debug!(
                    correlation_id = %correlation_id,
                    task_type = pending.task_type,
                    "Pending request receiver dropped"
                );
                false
            }
        }
    }

    /// Discard a request whose deadline elapsed.
    pub fn timed_out(&self, correlation_id: &str) -> bool {
        if self.pending.remove(correlation_id).is_some() {
            self.stats.total_timeouts.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Discard a request without resolving it.
    pub fn cancel(&self, correlation_id: &str) -> bool {
        if self.pending.remove(correlation_id).is_some() {
            self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
            debug!(correlation_id = correlation_id, "Cancelled pending request");
            true
        } else {
            false
        }
    }

    /// Discard every outstanding request. Waiting callers observe a closed
    /// channel.
    pub fn cancel_all(&self) -> usize {
        let ids: Vec<String> = self.pending.iter().map(|entry| entry.key().clone()).collect();
        ids.iter().filter(|id| self.cancel(id)).count()
    }

    /// Remove requests past their deadline.
    ///
    /// Returns the number of requests removed.
    pub fn remove_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        self.pending.retain(|id, request| {
            let elapsed = now.duration_since(request.created_at);
            if elapsed > request.timeout {
                warn!(
                    correlation_id = %id,
                    task_type = request.task_type,
                    elapsed_ms = elapsed.as_millis(),
                    timeout_ms = request.timeout.as_millis(),
                    "Removing expired pending request"
                );
                self.stats.total_timeouts.fetch_add(1, Ordering::Relaxed);
                removed += 1;
                false
            } else {
                true
            }
        });

        removed
    }

    /// Get number of currently pending requests
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Check if a correlation ID is pending
    pub fn is_pending(&self, correlation_id: &str) -> bool {
        self.pending.contains_key(correlation_id)
    }

    pub fn stats(&self) -> &PendingStats {
        &self.stats
    }
}
