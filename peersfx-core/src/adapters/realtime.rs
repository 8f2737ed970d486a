//! In-process realtime bus
//!
//! Fans each published message out to every live subscription on the
//! channel. Publishers receive their own messages if they are subscribed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::ports::{RealtimeBus, RealtimeMessage, Subscription};

type Subscribers = HashMap<String, HashMap<Uuid, mpsc::UnboundedSender<RealtimeMessage>>>;

#[derive(Default)]
pub struct LocalRealtimeBus {
    subscribers: Arc<Mutex<Subscribers>>,
    offline: AtomicBool,
}

impl LocalRealtimeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a dropped connection: subscribe and publish fail while set
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Live subscriptions on a channel
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.subscribers
            .lock()
            .map(|s| s.get(channel).map_or(0, HashMap::len))
            .unwrap_or(0)
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::realtime("realtime connection unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl RealtimeBus for LocalRealtimeBus {
    async fn subscribe(&self, channel: &str) -> Result<Subscription> {
        self.check_online()?;
        let (tx, rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();

        self.subscribers
            .lock()
            .map_err(|e| Error::realtime(format!("Lock poisoned: {}", e)))?
            .entry(channel.to_string())
            .or_default()
            .insert(id, tx);
        debug!(channel, subscription = %id, "subscribed");

        let subscribers = Arc::clone(&self.subscribers);
        let channel_name = channel.to_string();
        Ok(Subscription::new(channel, rx, move || {
            if let Ok(mut subs) = subscribers.lock() {
                if let Some(channel_subs) = subs.get_mut(&channel_name) {
                    channel_subs.remove(&id);
                }
            }
        }))
    }

    async fn publish(&self, channel: &str, event_type: &str, payload: JsonValue) -> Result<()> {
        self.check_online()?;
        let message = RealtimeMessage::new(event_type, payload);

        let mut subs = self
            .subscribers
            .lock()
            .map_err(|e| Error::realtime(format!("Lock poisoned: {}", e)))?;
        if let Some(channel_subs) = subs.get_mut(channel) {
            // Receivers dropped without the hook running are pruned here
            channel_subs.retain(|_, tx| tx.send(message.clone()).is_ok());
            debug!(channel, event_type, delivered = channel_subs.len(), "published");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_publish_reaches_channel_subscribers_only() {
        let bus = LocalRealtimeBus::new();
        let mut orders = bus.subscribe("marketplace-orders").await.unwrap();
        let mut other = bus.subscribe("kyc-submissions").await.unwrap();

        bus.publish("marketplace-orders", "new-order", json!({"order": {"id": "1"}}))
            .await
            .unwrap();

        let msg = orders.try_recv().unwrap();
        assert_eq!(msg.event_type, "new-order");
        assert_eq!(msg.data["order"]["id"], "1");
        assert!(other.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_unsubscribe_detaches() {
        let bus = LocalRealtimeBus::new();
        let sub = bus.subscribe("user-notifications").await.unwrap();
        assert_eq!(bus.subscriber_count("user-notifications"), 1);

        sub.unsubscribe();
        assert_eq!(bus.subscriber_count("user-notifications"), 0);

        // Publishing with nobody listening is fine
        bus.publish("user-notifications", "notification", json!({}))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_offline_bus_rejects_calls() {
        let bus = LocalRealtimeBus::new();
        bus.set_offline(true);
        assert!(bus.subscribe("x").await.is_err());
        assert!(bus.publish("x", "y", json!(null)).await.is_err());
    }
}
