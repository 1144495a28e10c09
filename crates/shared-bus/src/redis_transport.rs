//! # Redis Transport
//!
//! Redis pub/sub: one multiplexed connection for publishing, one dedicated
//! pub/sub connection per subscription. Redis itself drops messages for
//! channels without subscribers, matching the in-memory transport.

use crate::errors::BusError;
use crate::transport::{Transport, TransportSubscription};
use ::redis::aio::{MultiplexedConnection, PubSub};
use ::redis::AsyncCommands;
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Redis pub/sub transport.
pub struct RedisTransport {
    client: ::redis::Client,
    publisher: Mutex<Option<MultiplexedConnection>>,
    closed: AtomicBool,
}

impl RedisTransport {
    /// Connect to `url` (`redis://host:port/db`).
    ///
    /// Fails fast if the server is unreachable.
    pub async fn connect(url: &str) -> Result<Self, BusError> {
        let client = ::redis::Client::open(url)?;
        let publisher = client.get_multiplexed_async_connection().await?;
        info!(url = %url, "Connected to Redis");

        Ok(Self {
            client,
            publisher: Mutex::new(Some(publisher)),
            closed: AtomicBool::new(false),
        })
    }

    async fn publisher(&self) -> Result<MultiplexedConnection, BusError> {
        let mut guard = self.publisher.lock().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }
        if self.closed.load(Ordering::Acquire) {
            return Err(BusError::Closed);
        }
        let conn = self.client.get_multiplexed_async_connection().await?;
        *guard = Some(conn.clone());
        Ok(conn)
    }
}

#[async_trait]
impl Transport for RedisTransport {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn send(&self, channel: &str, payload: String) -> Result<usize, BusError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(BusError::Closed);
        }
        let mut conn = self.publisher().await?;
        let receivers: usize = conn.publish(channel, payload).await?;
        Ok(receivers)
    }

    async fn open(&self, channel: &str) -> Result<Box<dyn TransportSubscription>, BusError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(BusError::Closed);
        }
        let mut pubsub = self.client.get_async_pubsub().await?;
        // Returns after the server confirmed the SUBSCRIBE.
        pubsub.subscribe(channel).await?;

        Ok(Box::new(RedisSubscription {
            channel: channel.to_string(),
            pubsub: Some(pubsub),
        }))
    }

    async fn close(&self) -> Result<(), BusError> {
        self.closed.store(true, Ordering::Release);
        self.publisher.lock().await.take();
        debug!("Redis transport closed");
        Ok(())
    }
}

struct RedisSubscription {
    channel: String,
    pubsub: Option<PubSub>,
}

#[async_trait]
impl TransportSubscription for RedisSubscription {
    async fn next_message(&mut self) -> Option<Result<String, BusError>> {
        let pubsub = self.pubsub.as_mut()?;
        let msg = pubsub.on_message().next().await?;
        Some(
            msg.get_payload::<String>()
                .map_err(|e| BusError::Decode(e.to_string())),
        )
    }

    async fn unsubscribe(&mut self) -> Result<(), BusError> {
        // Dropping the connection also releases the channel server-side.
        if let Some(mut pubsub) = self.pubsub.take() {
            pubsub.unsubscribe(&self.channel).await?;
        }
        Ok(())
    }
}
