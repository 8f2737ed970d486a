//! Order domain model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Direction of a posted order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Buy,
    Sell,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Buy => "buy",
            OrderType::Sell => "sell",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(OrderType::Buy),
            "sell" => Ok(OrderType::Sell),
            other => Err(format!("unknown order type: {}", other)),
        }
    }
}

/// Lifecycle status of an order
///
/// `Matched` is only ever set locally (marketplace match button or a
/// realtime `order-matched` event). Nothing settles a matched order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Active,
    Matched,
    Completed,
    Cancelled,
    Disputed,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Active,
        OrderStatus::Matched,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
        OrderStatus::Disputed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Active => "active",
            OrderStatus::Matched => "matched",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Disputed => "disputed",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("unknown order status: {}", s))
    }
}

/// A posted intent to buy or sell one currency for another
///
/// `total_amount` is fixed when the order is created. Later edits to
/// `amount` or `rate` do not recompute it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_rating: Option<Decimal>,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub from_currency: String,
    pub to_currency: String,
    pub amount: Decimal,
    pub rate: Decimal,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    // Admin view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_with: Option<String>,
}

impl Order {
    /// Create an active order, computing the total from amount and rate
    ///
    /// A product too large for `Decimal` leaves the total at zero and fails
    /// `validate`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        order_type: OrderType,
        from_currency: impl Into<String>,
        to_currency: impl Into<String>,
        amount: Decimal,
        rate: Decimal,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            user_name: user_name.into(),
            user_email: None,
            user_rating: None,
            order_type,
            from_currency: from_currency.into(),
            to_currency: to_currency.into(),
            amount,
            rate,
            total_amount: compute_total(amount, rate).unwrap_or(Decimal::ZERO),
            status: OrderStatus::Active,
            created_at,
            updated_at: Some(created_at),
            notes: None,
            payment_method: None,
            matched_with: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.user_email = Some(email.into());
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == OrderStatus::Active
    }

    /// True if `currency` is on either side of the pair
    pub fn involves_currency(&self, currency: &str) -> bool {
        self.from_currency == currency || self.to_currency == currency
    }

    /// Set a new status and bump `updated_at`
    pub fn set_status(&mut self, status: OrderStatus, at: DateTime<Utc>) {
        self.status = status;
        self.updated_at = Some(at);
    }

    /// Validate order data
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.id.trim().is_empty() {
            return Err("order id cannot be empty");
        }
        if self.from_currency.trim().is_empty() || self.to_currency.trim().is_empty() {
            return Err("both currencies are required");
        }
        if self.from_currency == self.to_currency {
            return Err("from and to currencies must be different");
        }
        if self.amount <= Decimal::ZERO {
            return Err("amount must be positive");
        }
        if compute_total(self.amount, self.rate).is_none() {
            return Err("total is out of range");
        }
        Ok(())
    }
}

/// amount x rate rounded to two decimals, half away from zero
///
/// `None` when the product overflows `Decimal`.
pub fn compute_total(amount: Decimal, rate: Decimal) -> Option<Decimal> {
    amount
        .checked_mul(rate)
        .map(|total| total.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Two-decimal display form of a money value
pub fn format_money(value: Decimal) -> String {
    format!(
        "{:.2}",
        value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}
