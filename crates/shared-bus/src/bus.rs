//! # Message Bus
//!
//! Structured messages over a [`Transport`]: JSON in, JSON out.
//!
//! ```text
//! publish(channel, msg) ──encode──→ Transport::send
//!
//! subscribe(channel) ──→ Subscription ──run(handler, cancel)──→ receive loop
//!                                                                 │
//!                          decode ─ ok ─→ handler.handle(msg) ────┤
//!                             └── err ─→ log, next message ───────┘
//! ```

use crate::errors::BusError;
use crate::memory::InMemoryTransport;
use crate::transport::{Transport, TransportSubscription};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use shared_types::BusMessage;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Callback invoked once per decoded inbound message.
///
/// An error is logged by the receive loop and never ends the subscription.
#[async_trait]
pub trait MessageHandler: Send + Sync + 'static {
    async fn handle(&self, message: BusMessage) -> anyhow::Result<()>;
}

/// Counters kept by a bus.
#[derive(Debug, Default)]
pub struct BusStats {
    published: AtomicU64,
    dropped: AtomicU64,
    subscribers: RwLock<HashMap<String, usize>>,
}

/// Point-in-time copy of [`BusStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusStatsSnapshot {
    /// Messages handed to the transport.
    pub published: u64,
    /// Messages that reached no subscriber.
    pub dropped: u64,
    /// Live subscriptions per channel opened through this bus.
    pub subscribers: HashMap<String, usize>,
}

impl BusStats {
    fn snapshot(&self) -> BusStatsSnapshot {
        BusStatsSnapshot {
            published: self.published.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            subscribers: self.subscribers.read().clone(),
        }
    }

    fn track(&self, channel: &str) {
        *self
            .subscribers
            .write()
            .entry(channel.to_string())
            .or_insert(0) += 1;
    }

    fn untrack(&self, channel: &str) {
        let mut subs = self.subscribers.write();
        let Some(count) = subs.get_mut(channel) else {
            return;
        };
        *count = count.saturating_sub(1);
        if *count == 0 {
            subs.remove(channel);
        }
    }
}

struct BusInner {
    transport: Arc<dyn Transport>,
    stats: Arc<BusStats>,
    closed: AtomicBool,
}

/// Handle to a message bus. Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct MessageBus {
    inner: Arc<BusInner>,
}

impl MessageBus {
    /// Create a bus over `transport`.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(BusInner {
                transport,
                stats: Arc::new(BusStats::default()),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Create a bus over a fresh in-process transport.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryTransport::new()))
    }

    /// Create a bus from a URL: `memory://` or `redis://…`.
    pub async fn connect(url: &str) -> Result<Self, BusError> {
        if url.starts_with("memory://") {
            return Ok(Self::in_memory());
        }
        if url.starts_with("redis://") || url.starts_with("rediss://") {
            return Self::connect_redis(url).await;
        }
        Err(BusError::Transport(format!("Unsupported bus URL: {url}")))
    }

    #[cfg(feature = "redis")]
    async fn connect_redis(url: &str) -> Result<Self, BusError> {
        let transport = crate::redis_transport::RedisTransport::connect(url).await?;
        Ok(Self::new(Arc::new(transport)))
    }

    #[cfg(not(feature = "redis"))]
    async fn connect_redis(url: &str) -> Result<Self, BusError> {
        Err(BusError::Transport(format!(
            "Redis support not compiled in (enable the `redis` feature): {url}"
        )))
    }

    /// Name of the underlying transport.
    pub fn transport_name(&self) -> &'static str {
        self.inner.transport.name()
    }

    /// Encode `message` and send it on `channel`.
    ///
    /// Returns the number of subscribers that received it. Zero is not an
    /// error: the bus does not queue for absent subscribers.
    pub async fn publish<T>(&self, channel: &str, message: &T) -> Result<usize, BusError>
    where
        T: Serialize + ?Sized,
    {
        if self.is_closed() {
            return Err(BusError::Closed);
        }

        let payload =
            serde_json::to_string(message).map_err(|e| BusError::Serialization(e.to_string()))?;

        let receivers = self.inner.transport.send(channel, payload).await?;
        self.inner.stats.published.fetch_add(1, Ordering::Relaxed);

        if receivers == 0 {
            self.inner.stats.dropped.fetch_add(1, Ordering::Relaxed);
            debug!(channel = %channel, "Message dropped (no receivers)");
        } else {
            debug!(channel = %channel, receivers, "Message published");
        }
        Ok(receivers)
    }

    /// Subscribe to `channel`.
    ///
    /// Returns once the transport confirmed the subscription. Drive it with
    /// [`Subscription::run`] or use [`MessageBus::spawn_subscription`].
    pub async fn subscribe(&self, channel: &str) -> Result<Subscription, BusError> {
        if self.is_closed() {
            return Err(BusError::Closed);
        }

        let inner = self.inner.transport.open(channel).await?;
        self.inner.stats.track(channel);
        info!(channel = %channel, transport = self.transport_name(), "Subscription established");

        Ok(Subscription {
            channel: channel.to_string(),
            inner,
            _guard: SubscriberGuard {
                stats: self.inner.stats.clone(),
                channel: channel.to_string(),
            },
        })
    }

    /// Subscribe to `channel` and run the receive loop on a background task.
    pub async fn spawn_subscription<H>(
        &self,
        channel: &str,
        handler: Arc<H>,
    ) -> Result<SubscriptionHandle, BusError>
    where
        H: MessageHandler + ?Sized,
    {
        let subscription = self.subscribe(channel).await?;
        let cancel = CancellationToken::new();
        let task = tokio::spawn(subscription.run(handler, cancel.clone()));

        Ok(SubscriptionHandle {
            channel: channel.to_string(),
            cancel,
            task: Some(task),
        })
    }

    /// Release the transport.
    ///
    /// Stop every subscription first; any still running ends when the
    /// transport goes away.
    pub async fn close(&self) -> Result<(), BusError> {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.inner.transport.close().await?;
        info!(transport = self.transport_name(), "Message bus closed");
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Snapshot of the bus counters.
    pub fn stats(&self) -> BusStatsSnapshot {
        self.inner.stats.snapshot()
    }

    /// Live subscriptions on `channel` opened through this bus.
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.inner
            .stats
            .subscribers
            .read()
            .get(channel)
            .copied()
            .unwrap_or(0)
    }
}

impl std::fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageBus")
            .field("transport", &self.transport_name())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Keeps the per-channel subscriber count honest on every exit path.
struct SubscriberGuard {
    stats: Arc<BusStats>,
    channel: String,
}

impl Drop for SubscriberGuard {
    fn drop(&mut self) {
        self.stats.untrack(&self.channel);
        debug!(channel = %self.channel, "Subscription dropped");
    }
}

/// An established subscription on one channel.
///
/// Dropping it (including aborting the future driving [`Subscription::run`])
/// releases the channel.
pub struct Subscription {
    channel: String,
    inner: Box<dyn TransportSubscription>,
    _guard: SubscriberGuard,
}

impl Subscription {
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Receive the next decoded message.
    ///
    /// Malformed messages are logged and skipped. `Ok(None)` when the
    /// transport ended the subscription.
    pub async fn recv(&mut self) -> Result<Option<BusMessage>, BusError> {
        loop {
            match self.inner.next_message().await {
                None => return Ok(None),
                Some(Ok(raw)) => match decode(&raw) {
                    Ok(message) => return Ok(Some(message)),
                    Err(e) => {
                        error!(channel = %self.channel, error = %e, "Failed to decode message");
                    }
                },
                Some(Err(e)) if !e.is_fatal_to_subscription() => {
                    error!(channel = %self.channel, error = %e, "Failed to decode message");
                }
                Some(Err(e)) => return Err(e),
            }
        }
    }

    /// Run the receive loop until `cancel` fires or the transport ends it.
    ///
    /// Each message is handed to `handler` in arrival order; the next one is
    /// not read until the handler returns. Cancellation is only observed
    /// between messages, so a handler already running completes. The
    /// channel is unsubscribed before this returns.
    pub async fn run<H>(mut self, handler: Arc<H>, cancel: CancellationToken) -> Result<(), BusError>
    where
        H: MessageHandler + ?Sized,
    {
        let outcome = loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => break Ok(()),
                next = self.recv() => next,
            };

            match next {
                Ok(Some(message)) => {
                    if let Err(e) = handler.handle(message).await {
                        error!(channel = %self.channel, error = %e, "Message handler failed");
                    }
                }
                Ok(None) => break Ok(()),
                Err(e) => {
                    error!(channel = %self.channel, error = %e, "Subscription transport failed");
                    break Err(e);
                }
            }
        };

        self.unsubscribe().await;
        info!(channel = %self.channel, "Subscription ended");
        outcome
    }

    /// Unsubscribe now.
    pub async fn unsubscribe(&mut self) {
        if let Err(e) = self.inner.unsubscribe().await {
            warn!(channel = %self.channel, error = %e, "Unsubscribe failed");
        }
    }
}

/// Handle to a receive loop running on a background task.
///
/// Dropping the handle cancels the loop.
pub struct SubscriptionHandle {
    channel: String,
    cancel: CancellationToken,
    task: Option<JoinHandle<Result<(), BusError>>>,
}

impl SubscriptionHandle {
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Returns true once the receive loop has exited.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Cancel the loop and wait for it to unsubscribe. Idempotent.
    pub async fn stop(&mut self) -> Result<(), BusError> {
        self.cancel.cancel();
        let Some(task) = self.task.take() else {
            return Ok(());
        };

        match task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => Ok(()),
            Err(e) => Err(BusError::Transport(format!(
                "Subscription task on {} failed: {e}",
                self.channel
            ))),
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn decode(raw: &str) -> Result<BusMessage, BusError> {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(message)) => Ok(message),
        Ok(other) => Err(BusError::Decode(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(BusError::Decode(e.to_string())),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
