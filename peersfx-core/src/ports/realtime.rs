//! Realtime bus port - topic-based pub/sub with JSON payloads

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tokio::sync::mpsc;

use crate::domain::result::Result;

pub const MARKETPLACE_ORDERS: &str = "marketplace-orders";
pub const USER_NOTIFICATIONS: &str = "user-notifications";
pub const KYC_SUBMISSIONS: &str = "kyc-submissions";

pub const NEW_ORDER: &str = "new-order";
pub const ORDER_MATCHED: &str = "order-matched";
pub const NEW_SUBMISSION: &str = "new-submission";
pub const NEW_NOTIFICATION: &str = "notification";

/// One event delivered on a channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeMessage {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: JsonValue,
}

impl RealtimeMessage {
    pub fn new(event_type: impl Into<String>, data: JsonValue) -> Self {
        Self {
            event_type: event_type.into(),
            data,
        }
    }
}

/// A live subscription to one channel
///
/// Delivery is at-least-once and unordered across channels. Dropping the
/// handle (or calling [`Subscription::unsubscribe`]) detaches it from the
/// bus.
pub struct Subscription {
    channel: String,
    receiver: mpsc::UnboundedReceiver<RealtimeMessage>,
    on_unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Build a subscription from a message receiver and a detach hook
    pub fn new(
        channel: impl Into<String>,
        receiver: mpsc::UnboundedReceiver<RealtimeMessage>,
        on_unsubscribe: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            channel: channel.into(),
            receiver,
            on_unsubscribe: Some(Box::new(on_unsubscribe)),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Wait for the next message. `None` once the bus side has gone away.
    pub async fn recv(&mut self) -> Option<RealtimeMessage> {
        self.receiver.recv().await
    }

    /// Take a message that has already arrived, without waiting
    pub fn try_recv(&mut self) -> Option<RealtimeMessage> {
        self.receiver.try_recv().ok()
    }

    /// Take every message that has already arrived
    pub fn drain(&mut self) -> Vec<RealtimeMessage> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hook) = self.on_unsubscribe.take() {
            hook();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

/// External realtime messaging service
#[async_trait]
pub trait RealtimeBus: Send + Sync {
    /// Start receiving events published on `channel`
    async fn subscribe(&self, channel: &str) -> Result<Subscription>;

    /// Publish an event to every subscriber of `channel`
    async fn publish(&self, channel: &str, event_type: &str, payload: JsonValue) -> Result<()>;
}
