//! Order form - pricing, validation and submission of new orders

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use tracing::{error, info, warn};

use crate::domain::currency::market_rate;
use crate::domain::ids::order_id;
use crate::domain::result::{Error, Result};
use crate::domain::{compute_total, format_money, AuthUser, Order, OrderType, Toast};
use crate::ports::data_store::ORDERS;
use crate::ports::realtime::{MARKETPLACE_ORDERS, NEW_ORDER};
use crate::ports::{Collection, DataStore, RealtimeBus, ToastSink};

/// Raw form state, as typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderForm {
    pub order_type: OrderType,
    pub from_currency: String,
    pub to_currency: String,
    pub amount: String,
    pub custom_rate: String,
    pub use_market_rate: bool,
    pub notes: String,
}

impl Default for OrderForm {
    fn default() -> Self {
        Self {
            order_type: OrderType::Sell,
            from_currency: String::new(),
            to_currency: String::new(),
            amount: String::new(),
            custom_rate: String::new(),
            use_market_rate: true,
            notes: String::new(),
        }
    }
}

fn parse_decimal(input: &str) -> Option<Decimal> {
    Decimal::from_str(input.trim()).ok()
}

impl OrderForm {
    pub fn new(order_type: OrderType, from: &str, to: &str, amount: &str) -> Self {
        Self {
            order_type,
            from_currency: from.to_string(),
            to_currency: to.to_string(),
            amount: amount.to_string(),
            ..Self::default()
        }
    }

    /// Switch to a custom rate
    pub fn with_custom_rate(mut self, rate: &str) -> Self {
        self.use_market_rate = false;
        self.custom_rate = rate.to_string();
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = notes.to_string();
        self
    }

    /// Table rate for the selected pair; 0 until both sides are chosen
    pub fn market_rate(&self) -> Decimal {
        if self.from_currency.is_empty() || self.to_currency.is_empty() {
            return Decimal::ZERO;
        }
        market_rate(&self.from_currency, &self.to_currency)
    }

    /// Market rate or the parsed custom rate (0 when unparseable)
    pub fn effective_rate(&self) -> Decimal {
        if self.use_market_rate {
            self.market_rate()
        } else {
            parse_decimal(&self.custom_rate).unwrap_or(Decimal::ZERO)
        }
    }

    /// amount x effective rate, rounded to cents. An unparseable amount
    /// counts as zero, and so does a product out of `Decimal` range.
    pub fn total(&self) -> Decimal {
        let amount = parse_decimal(&self.amount).unwrap_or(Decimal::ZERO);
        compute_total(amount, self.effective_rate()).unwrap_or(Decimal::ZERO)
    }

    pub fn total_display(&self) -> String {
        format_money(self.total())
    }

    /// Exchange the two sides; a no-op until both are chosen
    pub fn swap_currencies(&mut self) {
        if !self.from_currency.is_empty() && !self.to_currency.is_empty() {
            std::mem::swap(&mut self.from_currency, &mut self.to_currency);
        }
    }

    /// Check the form and return the parsed amount
    ///
    /// Each failure carries the toast that should be shown for it.
    fn validate(&self, user: Option<&AuthUser>) -> std::result::Result<Decimal, Toast> {
        if user.is_none() {
            return Err(Toast::error(
                "Authentication Required",
                "Please log in to create an order",
            ));
        }
        if self.from_currency.trim().is_empty()
            || self.to_currency.trim().is_empty()
            || self.amount.trim().is_empty()
        {
            return Err(Toast::error(
                "Missing Information",
                "Please fill in all required fields",
            ));
        }
        if self.from_currency == self.to_currency {
            return Err(Toast::error(
                "Invalid Selection",
                "From and To currencies must be different",
            ));
        }
        let amount = match parse_decimal(&self.amount) {
            Some(amount) if amount > Decimal::ZERO => amount,
            _ => {
                return Err(Toast::error(
                    "Invalid Amount",
                    "Amount must be a positive number",
                ))
            }
        };
        if compute_total(amount, self.effective_rate()).is_none() {
            return Err(Toast::error(
                "Invalid Amount",
                "Amount is too large for this rate",
            ));
        }
        Ok(amount)
    }
}

pub struct OrderFormService {
    store: Arc<dyn DataStore>,
    realtime: Arc<dyn RealtimeBus>,
    toasts: Arc<dyn ToastSink>,
}

impl OrderFormService {
    pub fn new(
        store: Arc<dyn DataStore>,
        realtime: Arc<dyn RealtimeBus>,
        toasts: Arc<dyn ToastSink>,
    ) -> Self {
        Self {
            store,
            realtime,
            toasts,
        }
    }

    /// Validate, store and announce a new order
    ///
    /// Validation happens before any remote call. A failed announcement
    /// after a successful create is logged; the order still counts.
    pub async fn submit(&self, form: &OrderForm, user: Option<&AuthUser>) -> Result<Order> {
        let amount = match form.validate(user) {
            Ok(amount) => amount,
            Err(toast) => {
                let err = if user.is_none() {
                    Error::Auth(toast.description.clone())
                } else {
                    Error::validation(toast.description.clone())
                };
                self.toasts.show(toast);
                return Err(err);
            }
        };
        let user = user.ok_or_else(|| Error::Auth("Please log in to create an order".into()))?;

        let rate = form.effective_rate();
        let mut order = Order::new(
            order_id(),
            &user.id,
            user.public_name(),
            form.order_type,
            &form.from_currency,
            &form.to_currency,
            amount,
            rate,
            Utc::now(),
        )
        .with_email(&user.email);
        if !form.notes.trim().is_empty() {
            order = order.with_notes(form.notes.trim());
        }

        let orders: Collection<Order> = Collection::new(self.store.as_ref(), ORDERS);
        let created = match orders.create(&order).await {
            Ok(created) => created,
            Err(e) => {
                error!(error = %e, "Order creation error");
                self.toasts.show(Toast::error(
                    "Error",
                    "Failed to create order. Please try again.",
                ));
                return Err(e);
            }
        };
        info!(order_id = %created.id, "order created");

        let message = format!(
            "New {} order: {} {} → {} {}",
            created.order_type,
            form.amount.trim(),
            created.from_currency,
            format_money(created.total_amount),
            created.to_currency
        );
        let payload = json!({ "order": created, "message": message });
        if let Err(e) = self
            .realtime
            .publish(MARKETPLACE_ORDERS, NEW_ORDER, payload)
            .await
        {
            warn!(error = %e, order_id = %created.id, "Failed to announce new order");
        }

        self.toasts.show(Toast::info(
            "Order Created Successfully!",
            format!(
                "Your {} order for {} {} has been posted to the marketplace.",
                created.order_type,
                form.amount.trim(),
                created.from_currency
            ),
        ));
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryDataStore, LocalRealtimeBus, RecordingToaster};
    use crate::ports::ListQuery;

    struct Fixture {
        service: OrderFormService,
        store: Arc<InMemoryDataStore>,
        bus: Arc<LocalRealtimeBus>,
        toasts: Arc<RecordingToaster>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryDataStore::new());
        let bus = Arc::new(LocalRealtimeBus::new());
        let toasts = Arc::new(RecordingToaster::new());
        let service = OrderFormService::new(store.clone(), bus.clone(), toasts.clone());
        Fixture {
            service,
            store,
            bus,
            toasts,
        }
    }

    fn alice() -> AuthUser {
        AuthUser::new("u1", "alice@example.com")
    }

    #[test]
    fn test_market_rate_quote() {
        let form = OrderForm::new(OrderType::Sell, "USD", "EUR", "500");
        assert_eq!(form.effective_rate(), Decimal::new(85, 2));
        assert_eq!(form.total_display(), "425.00");
    }

    #[test]
    fn test_custom_and_missing_rates() {
        let form = OrderForm::new(OrderType::Buy, "USD", "EUR", "100").with_custom_rate("0.905");
        assert_eq!(form.total_display(), "90.50");

        let bad = OrderForm::new(OrderType::Buy, "USD", "EUR", "100").with_custom_rate("abc");
        assert_eq!(bad.effective_rate(), Decimal::ZERO);

        let unselected = OrderForm::new(OrderType::Buy, "USD", "", "100");
        assert_eq!(unselected.market_rate(), Decimal::ZERO);

        let garbage_amount = OrderForm::new(OrderType::Buy, "USD", "EUR", "lots");
        assert_eq!(garbage_amount.total_display(), "0.00");
    }

    #[test]
    fn test_out_of_range_total_displays_zero() {
        let form = OrderForm::new(OrderType::Buy, "USD", "EUR", "79228162514264337593543950335")
            .with_custom_rate("2");
        assert_eq!(form.total(), Decimal::ZERO);
        assert_eq!(form.total_display(), "0.00");
    }

    #[tokio::test]
    async fn test_out_of_range_total_rejected_before_store() {
        let f = fixture();
        let mut sub = f.bus.subscribe(MARKETPLACE_ORDERS).await.unwrap();
        let form = OrderForm::new(OrderType::Buy, "USD", "EUR", "79228162514264337593543950335")
            .with_custom_rate("2");

        let err = f.service.submit(&form, Some(&alice())).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(f.toasts.titles(), vec!["Invalid Amount"]);
        assert_eq!(f.store.count(ORDERS), 0);
        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn test_swap() {
        let mut form = OrderForm::new(OrderType::Buy, "GBP", "USD", "1");
        form.swap_currencies();
        assert_eq!((form.from_currency.as_str(), form.to_currency.as_str()), ("USD", "GBP"));

        let mut half = OrderForm::new(OrderType::Buy, "GBP", "", "1");
        half.swap_currencies();
        assert_eq!(half.from_currency, "GBP");
    }

    #[tokio::test]
    async fn test_same_currency_rejected_before_store() {
        let f = fixture();
        f.store.set_offline(true);
        let form = OrderForm::new(OrderType::Sell, "USD", "USD", "100");

        let err = f.service.submit(&form, Some(&alice())).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(f.toasts.titles(), vec!["Invalid Selection"]);
    }

    #[tokio::test]
    async fn test_validation_order() {
        let f = fixture();
        let empty = OrderForm::default();

        assert!(matches!(
            f.service.submit(&empty, None).await,
            Err(Error::Auth(_))
        ));
        assert!(f.service.submit(&empty, Some(&alice())).await.is_err());
        let negative = OrderForm::new(OrderType::Sell, "USD", "EUR", "-5");
        assert!(f.service.submit(&negative, Some(&alice())).await.is_err());

        assert_eq!(
            f.toasts.titles(),
            vec!["Authentication Required", "Missing Information", "Invalid Amount"]
        );
        assert_eq!(f.store.count(ORDERS), 0);
    }

    #[tokio::test]
    async fn test_submit_stores_and_announces() {
        let f = fixture();
        let mut sub = f.bus.subscribe(MARKETPLACE_ORDERS).await.unwrap();
        let form = OrderForm::new(OrderType::Sell, "USD", "EUR", "500").with_notes("  fast ");

        let order = f.service.submit(&form, Some(&alice())).await.unwrap();
        assert!(order.id.starts_with("order_"));
        assert_eq!(order.user_name, "alice");
        assert_eq!(order.total_amount, Decimal::new(425, 0));
        assert_eq!(order.notes.as_deref(), Some("fast"));

        let stored = f.store.list(ORDERS, &ListQuery::new()).await.unwrap();
        assert_eq!(stored.len(), 1);

        let msg = sub.try_recv().unwrap();
        assert_eq!(msg.event_type, NEW_ORDER);
        assert_eq!(msg.data["message"], "New sell order: 500 USD → 425.00 EUR");
        assert_eq!(f.toasts.titles(), vec!["Order Created Successfully!"]);
    }

    #[tokio::test]
    async fn test_publish_failure_keeps_order() {
        let f = fixture();
        f.bus.set_offline(true);
        let form = OrderForm::new(OrderType::Buy, "EUR", "GBP", "10");

        assert!(f.service.submit(&form, Some(&alice())).await.is_ok());
        assert_eq!(f.store.count(ORDERS), 1);
    }

    #[tokio::test]
    async fn test_store_failure_toasts() {
        let f = fixture();
        f.store.set_offline(true);
        let form = OrderForm::new(OrderType::Buy, "EUR", "GBP", "10");

        assert!(f.service.submit(&form, Some(&alice())).await.is_err());
        assert_eq!(f.toasts.titles(), vec!["Error"]);
    }
}
