//! # Request/Reply Client
//!
//! Synchronous-looking calls over the bus:
//!
//! ```text
//! send(target, type, payload, timeout)
//!   1. correlation_id = uuid
//!   2. pending.register(correlation_id)
//!   3. publish Task{correlation_id, reply_to_channel} on target
//!   4. await reply | deadline
//!   5. deadline  → remove pending, Err(Timeout)
//!   6. reply     → success ? Ok(payload fields) : Err(Remote(error))
//! ```
//!
//! One client owns one private reply channel and one pending table; nothing
//! is shared between clients.

use crate::domain::error::RequestError;
use crate::domain::pending::PendingRequestStore;
use crate::ipc::listener::ReplyListener;
use shared_bus::{MessageBus, SubscriptionHandle};
use shared_types::{new_correlation_id, ReplyChannel, ReplyEnvelope, Task, TaskPayload};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Deadline used by callers that do not pick one.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Removes the pending entry if the `send` future is dropped mid-flight.
struct PendingGuard<'a> {
    store: &'a PendingRequestStore,
    correlation_id: &'a str,
    armed: bool,
}

impl PendingGuard<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.store.cancel(self.correlation_id);
        }
    }
}

/// Caller-side request/reply endpoint.
pub struct RequestReplyClient {
    bus: MessageBus,
    reply_channel: ReplyChannel,
    pending: Arc<PendingRequestStore>,
    listener: Mutex<Option<SubscriptionHandle>>,
    default_timeout: Duration,
}

impl RequestReplyClient {
    pub fn new(bus: MessageBus, reply_channel: ReplyChannel) -> Self {
        Self {
            bus,
            reply_channel,
            pending: Arc::new(PendingRequestStore::new()),
            listener: Mutex::new(None),
            default_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Client with a freshly generated `<role>:<instance>:<uuid>` reply channel.
    pub fn for_owner(bus: MessageBus, role: &str, instance: &str) -> Self {
        Self::new(bus, ReplyChannel::generate(role, instance))
    }

    #[must_use]
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn reply_channel(&self) -> &ReplyChannel {
        &self.reply_channel
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn pending(&self) -> &PendingRequestStore {
        &self.pending
    }

    /// Returns true while the reply subscription is active.
    pub async fn is_listening(&self) -> bool {
        self.listener
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Start the reply subscription unless it is already active.
    ///
    /// The subscription is confirmed by the transport before this returns;
    /// the extra yield lets the receive loop reach its first read.
    pub async fn ensure_listening(&self) -> Result<(), RequestError> {
        let mut listener = self.listener.lock().await;
        if listener.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return Ok(());
        }

        let handler = Arc::new(ReplyListener::new(
            self.reply_channel.as_str(),
            self.pending.clone(),
        ));
        let handle = self
            .bus
            .spawn_subscription(self.reply_channel.as_str(), handler)
            .await?;
        *listener = Some(handle);
        drop(listener);

        tokio::task::yield_now().await;
        info!(channel = %self.reply_channel, "Reply subscription started");
        Ok(())
    }

    /// Stop the reply subscription and fail every waiting request.
    pub async fn stop_listening(&self) {
        let Some(mut handle) = self.listener.lock().await.take() else {
            return;
        };
        if let Err(e) = handle.stop().await {
            warn!(channel = %self.reply_channel, error = %e, "Reply subscription ended with error");
        }

        let abandoned = self.pending.cancel_all();
        if abandoned > 0 {
            warn!(
                channel = %self.reply_channel,
                abandoned,
                "Reply subscription stopped with requests outstanding"
            );
        }
        info!(channel = %self.reply_channel, "Reply subscription stopped");
    }

    /// Publish a task to `target_channel` and wait for its reply.
    ///
    /// Returns the reply's payload fields (everything but `success` /
    /// `error`) on success.
    pub async fn send(
        &self,
        target_channel: &str,
        task_type: &str,
        payload: TaskPayload,
        timeout: Duration,
    ) -> Result<TaskPayload, RequestError> {
        self.send_with_correlation_id(target_channel, task_type, payload, timeout, new_correlation_id())
            .await
    }

    /// [`send`](Self::send) with a caller-supplied correlation id.
    ///
    /// Fails with `DuplicateCorrelationId` if that id is still outstanding.
    pub async fn send_with_correlation_id(
        &self,
        target_channel: &str,
        task_type: &str,
        payload: TaskPayload,
        timeout: Duration,
        correlation_id: String,
    ) -> Result<TaskPayload, RequestError> {
        self.ensure_listening().await?;

        let task = Task::request(task_type, payload, self.reply_channel.as_str())
            .with_correlation_id(correlation_id.clone());

        let receiver = self.pending.register(&correlation_id, task_type, timeout)?;
        let mut guard = PendingGuard {
            store: &self.pending,
            correlation_id: &correlation_id,
            armed: true,
        };

        info!(
            task_id = %task.id,
            task_type = %task_type,
            channel = %target_channel,
            correlation_id = %correlation_id,
            reply_to = %self.reply_channel,
            "Publishing task"
        );
        self.bus.publish(target_channel, &task).await?;

        let envelope = match tokio::time::timeout(timeout, receiver).await {
            Ok(Ok(envelope)) => {
                guard.disarm();
                envelope
            }
            Ok(Err(_)) => {
                guard.disarm();
                return Err(RequestError::ListenerClosed(correlation_id.clone()));
            }
            Err(_) => {
                guard.disarm();
                self.pending.timed_out(&correlation_id);
                error!(
                    task_type = %task_type,
                    channel = %target_channel,
                    correlation_id = %correlation_id,
                    timeout_ms = timeout.as_millis(),
                    "Timeout waiting for response"
                );
                return Err(RequestError::Timeout {
                    correlation_id: correlation_id.clone(),
                    channel: target_channel.to_string(),
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                });
            }
        };

        match envelope.data.into_result() {
            Ok(fields) => Ok(fields),
            Err(reason) => {
                let reason = reason.unwrap_or_else(|| {
                    format!("Task {task_type} failed in service {target_channel}")
                });
                error!(
                    task_type = %task_type,
                    channel = %target_channel,
                    correlation_id = %correlation_id,
                    error = %reason,
                    "Service returned failure"
                );
                Err(RequestError::Remote(reason))
            }
        }
    }

    /// Resolve a pending request directly.
    ///
    /// Returns false (after logging a warning) for unknown correlation ids.
    pub fn handle_reply(&self, envelope: ReplyEnvelope) -> bool {
        self.pending.complete(envelope)
    }
}
