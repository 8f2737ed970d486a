//! Notification center - per-user inbox with live delivery

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, warn};

use super::marketplace::{time_ago, LoadOutcome, LOADING_ERROR_DESCRIPTION, LOADING_ERROR_TITLE};
use crate::adapters::demo;
use crate::domain::ids::notification_id;
use crate::domain::result::{Error, Result};
use crate::domain::{AuthUser, Notification, NotificationType, Toast};
use crate::ports::data_store::NOTIFICATIONS;
use crate::ports::realtime::USER_NOTIFICATIONS;
use crate::ports::{
    Collection, DataStore, ListQuery, RealtimeBus, RealtimeMessage, SortDirection, Subscription,
    ToastSink,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadFilter {
    #[default]
    All,
    Unread,
    Read,
}

impl FromStr for ReadFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(ReadFilter::All),
            "unread" => Ok(ReadFilter::Unread),
            "read" => Ok(ReadFilter::Read),
            other => Err(format!("unknown read filter: {}", other)),
        }
    }
}

/// Filtered, newest-first copy of `notifications`
pub fn filter_notifications(
    notifications: &[Notification],
    read: ReadFilter,
    notification_type: Option<NotificationType>,
) -> Vec<Notification> {
    let mut view: Vec<Notification> = notifications
        .iter()
        .filter(|n| match read {
            ReadFilter::All => true,
            ReadFilter::Unread => !n.is_read,
            ReadFilter::Read => n.is_read,
        })
        .filter(|n| notification_type.map_or(true, |t| n.notification_type == t))
        .cloned()
        .collect();
    view.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    view
}

/// Like the marketplace label but anything under a minute is "Just now"
pub fn notification_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    if (now - then).num_minutes() < 1 {
        "Just now".to_string()
    } else {
        time_ago(then, now)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotificationPayload {
    user_id: String,
    title: String,
    message: String,
    #[serde(default, rename = "type")]
    notification_type: Option<NotificationType>,
    #[serde(default)]
    action_url: Option<String>,
}

pub struct NotificationCenter {
    store: Arc<dyn DataStore>,
    realtime: Arc<dyn RealtimeBus>,
    toasts: Arc<dyn ToastSink>,
    limit: usize,
    sync_mutations: bool,
    notifications: Vec<Notification>,
    subscription: Option<Subscription>,
}

impl NotificationCenter {
    pub fn new(
        store: Arc<dyn DataStore>,
        realtime: Arc<dyn RealtimeBus>,
        toasts: Arc<dyn ToastSink>,
        limit: usize,
        sync_mutations: bool,
    ) -> Self {
        Self {
            store,
            realtime,
            toasts,
            limit,
            sync_mutations,
            notifications: Vec::new(),
            subscription: None,
        }
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn view(&self, read: ReadFilter, notification_type: Option<NotificationType>) -> Vec<Notification> {
        filter_notifications(&self.notifications, read, notification_type)
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.is_read).count()
    }

    fn collection(&self) -> Collection<'_, Notification> {
        Collection::new(self.store.as_ref(), NOTIFICATIONS)
    }

    /// Load the user's inbox, falling back to sample notifications
    pub async fn load(&mut self, user_id: &str) -> LoadOutcome {
        let query = ListQuery::new()
            .filter("userId", user_id)
            .order_by("createdAt", SortDirection::Desc)
            .limit(self.limit);

        match self.collection().list(&query).await {
            Ok(list) => {
                self.notifications = list;
                LoadOutcome::Loaded(self.notifications.len())
            }
            Err(e) => {
                error!(error = %e, "Failed to load notifications");
                self.notifications = demo::fallback_notifications();
                self.toasts
                    .show(Toast::error(LOADING_ERROR_TITLE, LOADING_ERROR_DESCRIPTION));
                LoadOutcome::Fallback(self.notifications.len())
            }
        }
    }

    pub async fn subscribe(&mut self) -> bool {
        if self.subscription.is_some() {
            return true;
        }
        match self.realtime.subscribe(USER_NOTIFICATIONS).await {
            Ok(sub) => {
                self.subscription = Some(sub);
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to setup realtime notifications");
                false
            }
        }
    }

    pub fn unsubscribe(&mut self) {
        if let Some(sub) = self.subscription.take() {
            sub.unsubscribe();
        }
    }

    /// Apply everything that has arrived; returns the new notifications
    pub fn poll_events(&mut self, user: &AuthUser) -> Vec<Notification> {
        let messages = match self.subscription.as_mut() {
            Some(sub) => sub.drain(),
            None => return Vec::new(),
        };
        messages
            .iter()
            .filter_map(|m| self.apply_message(m, user))
            .collect()
    }

    pub async fn next_event(&mut self, user: &AuthUser) -> Option<Option<Notification>> {
        let message = self.subscription.as_mut()?.recv().await?;
        Some(self.apply_message(&message, user))
    }

    /// Turn a live message addressed to `user` into an unread notification
    ///
    /// Messages for other users and malformed payloads are ignored. The
    /// new notification is persisted in the background; a failure there is
    /// only logged.
    pub fn apply_message(&mut self, message: &RealtimeMessage, user: &AuthUser) -> Option<Notification> {
        let payload: NotificationPayload = match serde_json::from_value(message.data.clone()) {
            Ok(p) => p,
            Err(e) => {
                debug!(error = %e, "Ignoring malformed notification payload");
                return None;
            }
        };
        if payload.user_id != user.id {
            return None;
        }

        let mut notification = Notification::new(
            notification_id(),
            &user.id,
            payload.title,
            payload.message,
            payload.notification_type.unwrap_or_default(),
            Utc::now(),
        );
        notification.action_url = payload.action_url;

        self.notifications.insert(0, notification.clone());
        self.persist_in_background(notification.clone());
        self.toasts.show(Toast::info(
            notification.title.clone(),
            notification.message.clone(),
        ));
        Some(notification)
    }

    fn persist_in_background(&self, notification: Notification) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(id = %notification.id, "No runtime; notification not persisted");
            return;
        };
        let store = Arc::clone(&self.store);
        handle.spawn(async move {
            let notifications: Collection<Notification> = Collection::new(store.as_ref(), NOTIFICATIONS);
            if let Err(e) = notifications.create(&notification).await {
                error!(error = %e, id = %notification.id, "Failed to save notification");
            }
        });
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.notifications
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| Error::not_found(format!("notification {}", id)))
    }

    async fn sync(&self, id: &str, patch: Option<serde_json::Value>) {
        if !self.sync_mutations {
            return;
        }
        let result = match patch {
            Some(patch) => self.collection().update(id, patch).await,
            None => self.collection().delete(id).await,
        };
        if let Err(e) = result {
            warn!(error = %e, id, "Failed to sync notification change");
        }
    }

    pub async fn mark_read(&mut self, id: &str) -> Result<()> {
        self.set_read(id, true).await
    }

    pub async fn mark_unread(&mut self, id: &str) -> Result<()> {
        self.set_read(id, false).await
    }

    async fn set_read(&mut self, id: &str, is_read: bool) -> Result<()> {
        let index = self.position(id)?;
        self.notifications[index].is_read = is_read;
        self.sync(id, Some(json!({ "isRead": is_read }))).await;
        Ok(())
    }

    pub async fn delete(&mut self, id: &str) -> Result<Notification> {
        let index = self.position(id)?;
        let removed = self.notifications.remove(index);
        self.sync(id, None).await;
        self.toasts.show(Toast::info(
            "Notification Deleted",
            "The notification has been removed.",
        ));
        Ok(removed)
    }

    /// Returns how many were unread
    pub async fn mark_all_read(&mut self) -> usize {
        let unread: Vec<String> = self
            .notifications
            .iter()
            .filter(|n| !n.is_read)
            .map(|n| n.id.clone())
            .collect();
        for n in self.notifications.iter_mut() {
            n.is_read = true;
        }
        for id in &unread {
            self.sync(id, Some(json!({ "isRead": true }))).await;
        }
        self.toasts.show(Toast::info(
            "All Marked as Read",
            "All notifications have been marked as read.",
        ));
        unread.len()
    }
}

impl Drop for NotificationCenter {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryDataStore, LocalRealtimeBus, RecordingToaster};
    use crate::ports::realtime::NEW_NOTIFICATION;
    use chrono::Duration;

    fn center(sync: bool) -> (NotificationCenter, Arc<InMemoryDataStore>, Arc<LocalRealtimeBus>, Arc<RecordingToaster>) {
        let store = Arc::new(InMemoryDataStore::new());
        let bus = Arc::new(LocalRealtimeBus::new());
        let toasts = Arc::new(RecordingToaster::new());
        let center = NotificationCenter::new(store.clone(), bus.clone(), toasts.clone(), 50, sync);
        (center, store, bus, toasts)
    }

    fn user() -> AuthUser {
        AuthUser::new("user1", "demo@example.com")
    }

    #[tokio::test]
    async fn test_load_fallback_and_unread_count() {
        let (mut c, store, _bus, toasts) = center(false);
        store.set_offline(true);
        assert_eq!(c.load("user1").await, LoadOutcome::Fallback(6));
        assert_eq!(c.unread_count(), 3);
        assert_eq!(toasts.titles(), vec![LOADING_ERROR_TITLE]);
    }

    #[tokio::test]
    async fn test_live_message_for_me_is_added_and_saved() {
        let (mut c, store, bus, toasts) = center(false);
        c.subscribe().await;

        bus.publish(
            USER_NOTIFICATIONS,
            NEW_NOTIFICATION,
            json!({"userId": "someone-else", "title": "x", "message": "y"}),
        )
        .await
        .unwrap();
        bus.publish(
            USER_NOTIFICATIONS,
            NEW_NOTIFICATION,
            json!({"userId": "user1", "title": "Order Matched!", "message": "done", "type": "success"}),
        )
        .await
        .unwrap();

        let added = c.poll_events(&user());
        assert_eq!(added.len(), 1);
        assert!(added[0].id.starts_with("notif_"));
        assert_eq!(added[0].notification_type, NotificationType::Success);
        assert!(!added[0].is_read);
        assert_eq!(toasts.titles(), vec!["Order Matched!"]);

        tokio::task::yield_now().await;
        assert_eq!(store.count(NOTIFICATIONS), 1);
    }

    #[tokio::test]
    async fn test_missing_type_defaults_to_info() {
        let (mut c, _store, _bus, _toasts) = center(false);
        let msg = RealtimeMessage::new(NEW_NOTIFICATION, json!({"userId": "user1", "title": "t", "message": "m"}));
        let n = c.apply_message(&msg, &user()).unwrap();
        assert_eq!(n.notification_type, NotificationType::Info);
    }

    #[tokio::test]
    async fn test_mutations_are_local_by_default() {
        let (mut c, store, _bus, toasts) = center(false);
        c.notifications = demo::fallback_notifications();
        store.set_offline(true);

        c.mark_read("1").await.unwrap();
        c.mark_unread("3").await.unwrap();
        assert!(c.notifications()[0].is_read);
        assert!(c.mark_read("missing").await.is_err());

        c.delete("2").await.unwrap();
        assert_eq!(c.notifications().len(), 5);

        assert_eq!(c.mark_all_read().await, 2);
        assert_eq!(c.unread_count(), 0);
        assert_eq!(toasts.titles(), vec!["Notification Deleted", "All Marked as Read"]);
    }

    #[tokio::test]
    async fn test_sync_mutations_reach_store() {
        let (mut c, store, _bus, _toasts) = center(true);
        demo::seed_store(store.as_ref()).await.unwrap();
        c.load("user1").await;

        c.mark_read("6").await.unwrap();
        c.delete("5").await.unwrap();

        let rows = store.list(NOTIFICATIONS, &ListQuery::new().filter("id", "6")).await.unwrap();
        assert_eq!(rows[0]["isRead"], true);
        assert_eq!(store.count(NOTIFICATIONS), 5);
    }

    #[test]
    fn test_filtered_view_sorted_newest_first() {
        let list = demo::fallback_notifications();
        let unread_success = filter_notifications(&list, ReadFilter::Unread, Some(NotificationType::Success));
        let ids: Vec<&str> = unread_success.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);

        let read = filter_notifications(&list, ReadFilter::Read, None);
        assert!(read.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[test]
    fn test_age_label() {
        let now = Utc::now();
        assert_eq!(notification_age(now - Duration::seconds(20), now), "Just now");
        assert_eq!(notification_age(now - Duration::minutes(7), now), "7m ago");
    }
}
