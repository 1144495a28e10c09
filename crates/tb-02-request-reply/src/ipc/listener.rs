//! Reply listener: the handler of a client's reply channel subscription.

use crate::domain::pending::PendingRequestStore;
use async_trait::async_trait;
use shared_bus::MessageHandler;
use shared_types::{BusMessage, ReplyEnvelope};
use std::sync::Arc;
use tracing::{debug, warn};

/// Routes reply envelopes to the pending request they answer.
pub struct ReplyListener {
    channel: String,
    pending: Arc<PendingRequestStore>,
}

impl ReplyListener {
    pub fn new(channel: impl Into<String>, pending: Arc<PendingRequestStore>) -> Self {
        Self {
            channel: channel.into(),
            pending,
        }
    }

    /// Resolve the pending request for `envelope`, if any.
    ///
    /// Returns true if a waiting caller was resolved.
    pub fn handle_reply(&self, envelope: ReplyEnvelope) -> bool {
        debug!(
            channel = %self.channel,
            correlation_id = %envelope.correlation_id,
            success = envelope.data.success,
            "Received message on reply channel"
        );
        self.pending.complete(envelope)
    }
}

#[async_trait]
impl MessageHandler for ReplyListener {
    async fn handle(&self, message: BusMessage) -> anyhow::Result<()> {
        match ReplyEnvelope::from_message(message) {
            Ok(envelope) => {
                self.handle_reply(envelope);
            }
            Err(e) => {
                warn!(channel = %self.channel, error = %e, "Discarding malformed reply");
            }
        }
        Ok(())
    }
}
