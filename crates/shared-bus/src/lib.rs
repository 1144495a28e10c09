//! # Shared Bus - Channel-Addressed Publish/Subscribe
//!
//! Every producer, worker and reply listener talks through a [`MessageBus`].
//!
//! ## Delivery Model
//!
//! - **Best-effort, at-most-once**: no acknowledgement, no persistence.
//! - **No queueing for absent subscribers**: a message published to a channel
//!   with no live subscription is dropped (and counted).
//! - **Acknowledged subscribe**: [`MessageBus::subscribe`] returns only once
//!   the transport confirmed the subscription.
//!
//! ## Topology
//!
//! ```text
//! ┌──────────────┐   publish(llm_tasks)   ┌──────────────┐
//! │   Producer   │ ─────────────┐         │    Worker    │
//! │              │              ▼         │              │
//! │ reply chan ◄─┼──┐     ┌──────────────┐│              │
//! └──────────────┘  │     │  Message Bus │┼─► subscribe  │
//!                   └─────│  (Transport) │◄── publish ───┤
//!                         └──────────────┘└──────────────┘
//! ```
//!
//! ## Transports
//!
//! - [`InMemoryTransport`]: per-channel `tokio::sync::broadcast`.
//! - `RedisTransport`: Redis pub/sub, behind the `redis` feature.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod bus;
pub mod errors;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_transport;
pub mod transport;

// Re-export main types
pub use bus::{BusStats, BusStatsSnapshot, MessageBus, MessageHandler, Subscription, SubscriptionHandle};
pub use errors::BusError;
pub use memory::InMemoryTransport;
#[cfg(feature = "redis")]
pub use redis_transport::RedisTransport;
pub use transport::{Transport, TransportSubscription};

/// Messages buffered per channel before a slow subscriber starts lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(DEFAULT_CHANNEL_CAPACITY, 1000);
    }
}
