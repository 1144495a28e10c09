//! # In-Memory Transport
//!
//! One `tokio::sync::broadcast` channel per bus channel name.
//! Suitable for single-process operation and tests; distributed deployments
//! use the Redis transport.

use crate::errors::BusError;
use crate::transport::{Transport, TransportSubscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

type Channels = Arc<RwLock<HashMap<String, broadcast::Sender<String>>>>;

/// In-process pub/sub transport.
pub struct InMemoryTransport {
    /// Broadcast sender per channel name.
    channels: Channels,

    /// Set once `close()` has been called.
    closed: AtomicBool,

    /// Buffer per channel before slow subscribers start lagging.
    capacity: usize,
}

impl InMemoryTransport {
    /// Create a transport with default per-channel capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a transport with the given per-channel capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            closed: AtomicBool::new(false),
            capacity: capacity.max(1),
        }
    }

    /// Number of live receivers on `channel`.
    #[must_use]
    pub fn receiver_count(&self, channel: &str) -> usize {
        self.channels
            .read()
            .get(channel)
            .map_or(0, broadcast::Sender::receiver_count)
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn send(&self, channel: &str, payload: String) -> Result<usize, BusError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(BusError::Closed);
        }

        let channels = self.channels.read();
        let Some(sender) = channels.get(channel) else {
            return Ok(0);
        };
        // Err only means nobody is listening right now.
        Ok(sender.send(payload).unwrap_or(0))
    }

    async fn open(&self, channel: &str) -> Result<Box<dyn TransportSubscription>, BusError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(BusError::Closed);
        }

        let receiver = {
            let mut channels = self.channels.write();
            channels
                .entry(channel.to_string())
                .or_insert_with(|| broadcast::channel(self.capacity).0)
                .subscribe()
        };

        Ok(Box::new(InMemorySubscription {
            channel: channel.to_string(),
            receiver: Some(receiver),
            channels: self.channels.clone(),
        }))
    }

    async fn close(&self) -> Result<(), BusError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        // Dropping the senders ends every open subscription.
        self.channels.write().clear();
        debug!("In-memory transport closed");
        Ok(())
    }
}

struct InMemorySubscription {
    channel: String,
    receiver: Option<broadcast::Receiver<String>>,
    channels: Channels,
}

impl InMemorySubscription {
    fn release(&mut self) {
        if self.receiver.take().is_none() {
            return;
        }
        let mut channels = self.channels.write();
        if channels
            .get(&self.channel)
            .is_some_and(|sender| sender.receiver_count() == 0)
        {
            channels.remove(&self.channel);
        }
    }
}

#[async_trait]
impl TransportSubscription for InMemorySubscription {
    async fn next_message(&mut self) -> Option<Result<String, BusError>> {
        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.recv().await {
                Ok(payload) => return Some(Ok(payload)),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!(
                        channel = %self.channel,
                        lagged = count,
                        "Subscriber lagged, some messages dropped"
                    );
                }
            }
        }
    }

    async fn unsubscribe(&mut self) -> Result<(), BusError> {
        self.release();
        Ok(())
    }
}

impl Drop for InMemorySubscription {
    fn drop(&mut self) {
        self.release();
    }
}
