//! # Transport Port
//!
//! The bus speaks JSON text; a transport only moves strings between
//! channel names. Delivery is best-effort and at-most-once: a message sent
//! to a channel nobody listens on is gone.

use crate::errors::BusError;
use async_trait::async_trait;

/// A pub/sub transport shared by every publisher and subscription of a bus.
///
/// Implementations must be safe to use from many tasks at once.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short name for logs (`memory`, `redis`).
    fn name(&self) -> &'static str;

    /// Send an encoded message.
    ///
    /// Returns the number of subscribers the transport handed it to.
    async fn send(&self, channel: &str, payload: String) -> Result<usize, BusError>;

    /// Open a subscription on `channel`.
    ///
    /// Returns once the transport has confirmed the subscription; messages
    /// sent after that point are delivered to it.
    async fn open(&self, channel: &str) -> Result<Box<dyn TransportSubscription>, BusError>;

    /// Release the underlying connection.
    async fn close(&self) -> Result<(), BusError>;
}

/// Receiving end of one channel subscription.
#[async_trait]
pub trait TransportSubscription: Send {
    /// Wait for the next raw message.
    ///
    /// `None` means the transport ended the subscription. `Some(Err(_))`
    /// with a decode error skips one message; any other error is fatal.
    async fn next_message(&mut self) -> Option<Result<String, BusError>>;

    /// Unsubscribe and release the channel. Idempotent.
    async fn unsubscribe(&mut self) -> Result<(), BusError>;
}
