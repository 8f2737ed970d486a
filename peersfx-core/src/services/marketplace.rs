//! Marketplace service - live order list and its filtered view
//!
//! The list is fed by one bulk load and by `new-order` / `order-matched`
//! events on the `marketplace-orders` channel. Filtering and sorting are
//! pure and never touch the list itself.

use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, warn};

use crate::adapters::demo;
use crate::domain::result::{Error, Result};
use crate::domain::{AuthUser, Order, OrderStatus, OrderType, Toast};
use crate::ports::data_store::ORDERS;
use crate::ports::realtime::{MARKETPLACE_ORDERS, NEW_ORDER, ORDER_MATCHED};
use crate::ports::{
    Collection, DataStore, ListQuery, RealtimeBus, RealtimeMessage, SortDirection, Subscription,
    ToastSink,
};

pub const LOADING_ERROR_TITLE: &str = "Loading Error";
pub const LOADING_ERROR_DESCRIPTION: &str = "Using sample data. Some features may be limited.";

/// Sort key for the marketplace view; every key sorts descending
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Newest,
    Rate,
    Amount,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" => Ok(SortKey::Newest),
            "rate" => Ok(SortKey::Rate),
            "amount" => Ok(SortKey::Amount),
            other => Err(format!("unknown sort key: {}", other)),
        }
    }
}

/// View settings. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketFilter {
    pub search_term: String,
    pub order_type: Option<OrderType>,
    pub currency: Option<String>,
    pub sort_by: SortKey,
}

impl MarketFilter {
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn order_type(mut self, order_type: OrderType) -> Self {
        self.order_type = Some(order_type);
        self
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency = Some(code.into());
        self
    }

    pub fn sort_by(mut self, key: SortKey) -> Self {
        self.sort_by = key;
        self
    }

    fn accepts(&self, order: &Order) -> bool {
        let term = self.search_term.to_lowercase();
        let search_ok = term.is_empty()
            || order.user_name.to_lowercase().contains(&term)
            || order.from_currency.to_lowercase().contains(&term)
            || order.to_currency.to_lowercase().contains(&term);
        let type_ok = self.order_type.map_or(true, |t| order.order_type == t);
        let currency_ok = self
            .currency
            .as_deref()
            .map_or(true, |c| order.involves_currency(c));
        search_ok && type_ok && currency_ok
    }
}

/// Filter then sort (stable) a copy of `orders`
pub fn filter_orders(orders: &[Order], filter: &MarketFilter) -> Vec<Order> {
    let mut view: Vec<Order> = orders.iter().filter(|o| filter.accepts(o)).cloned().collect();
    view.sort_by(|a, b| compare_desc(a, b, filter.sort_by));
    view
}

fn compare_desc(a: &Order, b: &Order, key: SortKey) -> Ordering {
    match key {
        SortKey::Newest => b.created_at.cmp(&a.created_at),
        SortKey::Rate => b.rate.cmp(&a.rate),
        SortKey::Amount => b.amount.cmp(&a.amount),
    }
}

/// Relative age label: `5m ago`, `3h ago`, `2d ago`
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - then).num_minutes().max(0);
    if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        format!("{}h ago", minutes / 60)
    } else {
        format!("{}d ago", minutes / 1440)
    }
}

/// How the last load went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(usize),
    /// The store failed; the sample list is shown instead
    Fallback(usize),
}

/// What a realtime event did to the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Inserted(String),
    /// `new-order` for an id already in the list
    Duplicate(String),
    Matched(String),
    /// `order-matched` for an id not in the list
    UnknownOrder(String),
    Ignored,
}

#[derive(Deserialize)]
struct NewOrderPayload {
    order: Order,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderMatchedPayload {
    order_id: String,
    #[serde(default)]
    matched_by: Option<String>,
}

pub struct MarketplaceService {
    store: Arc<dyn DataStore>,
    realtime: Arc<dyn RealtimeBus>,
    toasts: Arc<dyn ToastSink>,
    order_limit: usize,
    orders: Vec<Order>,
    subscription: Option<Subscription>,
}

impl MarketplaceService {
    pub fn new(
        store: Arc<dyn DataStore>,
        realtime: Arc<dyn RealtimeBus>,
        toasts: Arc<dyn ToastSink>,
        order_limit: usize,
    ) -> Self {
        Self {
            store,
            realtime,
            toasts,
            order_limit,
            orders: Vec::new(),
            subscription: None,
        }
    }

    /// Current list, newest insert first
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn view(&self, filter: &MarketFilter) -> Vec<Order> {
        filter_orders(&self.orders, filter)
    }

    /// Load active orders, falling back to the sample list on failure
    pub async fn load(&mut self) -> LoadOutcome {
        let query = ListQuery::new()
            .filter("status", OrderStatus::Active.as_str())
            .order_by("createdAt", SortDirection::Desc)
            .limit(self.order_limit);

        let orders: Collection<Order> = Collection::new(self.store.as_ref(), ORDERS);
        match orders.list(&query).await {
            Ok(list) => {
                self.orders = list;
                LoadOutcome::Loaded(self.orders.len())
            }
            Err(e) => {
                error!(error = %e, "Failed to load orders");
                self.orders = demo::fallback_orders();
                self.toasts
                    .show(Toast::error(LOADING_ERROR_TITLE, LOADING_ERROR_DESCRIPTION));
                LoadOutcome::Fallback(self.orders.len())
            }
        }
    }

    /// Reload and confirm with a toast
    pub async fn refresh(&mut self) -> LoadOutcome {
        let outcome = self.load().await;
        if let LoadOutcome::Loaded(_) = outcome {
            self.toasts.show(Toast::info(
                "Marketplace Updated",
                "Latest orders have been loaded",
            ));
        }
        outcome
    }

    /// Start listening on `marketplace-orders`. A failure is logged and
    /// leaves the list static.
    pub async fn subscribe(&mut self) -> bool {
        if self.subscription.is_some() {
            return true;
        }
        match self.realtime.subscribe(MARKETPLACE_ORDERS).await {
            Ok(sub) => {
                self.subscription = Some(sub);
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to setup realtime");
                false
            }
        }
    }

    pub fn unsubscribe(&mut self) {
        if let Some(sub) = self.subscription.take() {
            sub.unsubscribe();
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Apply every event that has already arrived
    pub fn poll_events(&mut self, current_user: Option<&AuthUser>) -> Vec<EventOutcome> {
        let messages = match self.subscription.as_mut() {
            Some(sub) => sub.drain(),
            None => return Vec::new(),
        };
        messages
            .iter()
            .map(|m| self.apply_event(m, current_user))
            .collect()
    }

    /// Wait for the next event and apply it. `None` when not subscribed or
    /// the bus closed.
    pub async fn next_event(&mut self, current_user: Option<&AuthUser>) -> Option<EventOutcome> {
        let message = self.subscription.as_mut()?.recv().await?;
        Some(self.apply_event(&message, current_user))
    }

    /// Reconcile one realtime message into the list
    pub fn apply_event(
        &mut self,
        message: &RealtimeMessage,
        current_user: Option<&AuthUser>,
    ) -> EventOutcome {
        match message.event_type.as_str() {
            NEW_ORDER => match serde_json::from_value::<NewOrderPayload>(message.data.clone()) {
                Ok(payload) => self.insert(payload.order, &payload.message),
                Err(e) => {
                    debug!(error = %e, "Ignoring malformed new-order payload");
                    EventOutcome::Ignored
                }
            },
            ORDER_MATCHED => {
                match serde_json::from_value::<OrderMatchedPayload>(message.data.clone()) {
                    Ok(payload) => self.mark_matched(payload, current_user),
                    Err(e) => {
                        debug!(error = %e, "Ignoring malformed order-matched payload");
                        EventOutcome::Ignored
                    }
                }
            }
            other => {
                debug!(event_type = other, "Ignoring marketplace event");
                EventOutcome::Ignored
            }
        }
    }

    fn insert(&mut self, order: Order, message: &str) -> EventOutcome {
        // At-least-once delivery: the id is the idempotency key
        if self.orders.iter().any(|o| o.id == order.id) {
            return EventOutcome::Duplicate(order.id);
        }
        let id = order.id.clone();
        self.orders.insert(0, order);
        self.toasts.show(Toast::info("New Order Available", message));
        EventOutcome::Inserted(id)
    }

    fn mark_matched(
        &mut self,
        payload: OrderMatchedPayload,
        current_user: Option<&AuthUser>,
    ) -> EventOutcome {
        let Some(order) = self.orders.iter_mut().find(|o| o.id == payload.order_id) else {
            return EventOutcome::UnknownOrder(payload.order_id);
        };
        order.set_status(OrderStatus::Matched, Utc::now());

        let by_me = match (&payload.matched_by, current_user) {
            (Some(by), Some(me)) => *by == me.id,
            _ => false,
        };
        if !by_me {
            self.toasts.show(Toast::info(
                "Order Matched",
                "An order has been matched in the marketplace",
            ));
        }
        EventOutcome::Matched(payload.order_id)
    }

    /// Mark an active order as matched by `user`
    ///
    /// This is a local status flip; nothing is settled. Other clients hear
    /// about it through a best-effort `order-matched` event.
    pub async fn match_order(&mut self, order_id: &str, user: &AuthUser) -> Result<Order> {
        let Some(order) = self.orders.iter_mut().find(|o| o.id == order_id) else {
            let err = Error::validation(format!("Order {} is not in the marketplace", order_id));
            self.toasts.show(Toast::error("Match Failed", err.to_string()));
            return Err(err);
        };
        if !order.is_active() {
            let err = Error::validation(format!("Order {} is already {}", order_id, order.status));
            self.toasts.show(Toast::error("Match Failed", err.to_string()));
            return Err(err);
        }

        order.set_status(OrderStatus::Matched, Utc::now());
        order.matched_with = Some(user.id.clone());
        let matched = order.clone();

        self.toasts.show(Toast::info(
            "Order Matched!",
            format!(
                "You've been matched with {} for {} {}",
                matched.user_name, matched.amount, matched.from_currency
            ),
        ));

        let payload = json!({ "orderId": matched.id, "matchedBy": user.id });
        if let Err(e) = self
            .realtime
            .publish(MARKETPLACE_ORDERS, ORDER_MATCHED, payload)
            .await
        {
            warn!(error = %e, order_id, "Failed to publish order match");
        }

        Ok(matched)
    }

    /// Start a conversation with the order's owner (toast only)
    pub fn contact(&self, order_id: &str) -> Result<()> {
        let order = self
            .orders
            .iter()
            .find(|o| o.id == order_id)
            .ok_or_else(|| Error::not_found(format!("order {}", order_id)))?;
        self.toasts.show(Toast::info(
            "Chat Initiated",
            format!("Starting conversation with {}", order.user_name),
        ));
        Ok(())
    }
}

impl Drop for MarketplaceService {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
