//! Order management for the admin console

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::result::{Error, Result};
use crate::domain::{format_money, Order, OrderStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    Cancel,
    ResolveDispute,
    EscalateDispute,
}

impl OrderAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderAction::Cancel => "cancel",
            OrderAction::ResolveDispute => "resolve_dispute",
            OrderAction::EscalateDispute => "escalate_dispute",
        }
    }

    /// The status an order must be in for this action
    fn required_status(&self) -> OrderStatus {
        match self {
            OrderAction::Cancel => OrderStatus::Active,
            OrderAction::ResolveDispute | OrderAction::EscalateDispute => OrderStatus::Disputed,
        }
    }
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "cancel" => Ok(OrderAction::Cancel),
            "resolve_dispute" | "resolve" => Ok(OrderAction::ResolveDispute),
            "escalate_dispute" | "escalate" => Ok(OrderAction::EscalateDispute),
            other => Err(format!("unknown order action: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrderStats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub disputed: usize,
}

#[derive(Serialize)]
struct OrderRow<'a> {
    id: &'a str,
    user_email: &'a str,
    #[serde(rename = "type")]
    order_type: &'a str,
    from_currency: &'a str,
    to_currency: &'a str,
    amount: String,
    rate: String,
    total_amount: String,
    status: &'a str,
    payment_method: &'a str,
    created_at: String,
}

pub struct OrderBook {
    orders: Vec<Order>,
}

impl OrderBook {
    pub fn new(orders: Vec<Order>) -> Self {
        Self { orders }
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn get(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    /// Search over id, user email and both currencies; optional status
    pub fn search(&self, term: &str, status: Option<OrderStatus>) -> Vec<&Order> {
        let term = term.to_lowercase();
        self.orders
            .iter()
            .filter(|o| {
                term.is_empty()
                    || o.id.to_lowercase().contains(&term)
                    || o.user_email
                        .as_deref()
                        .is_some_and(|e| e.to_lowercase().contains(&term))
                    || o.from_currency.to_lowercase().contains(&term)
                    || o.to_currency.to_lowercase().contains(&term)
            })
            .filter(|o| status.map_or(true, |s| o.status == s))
            .collect()
    }

    pub fn stats(&self) -> OrderStats {
        let count = |s: OrderStatus| self.orders.iter().filter(|o| o.status == s).count();
        OrderStats {
            total: self.orders.len(),
            active: count(OrderStatus::Active),
            completed: count(OrderStatus::Completed),
            disputed: count(OrderStatus::Disputed),
        }
    }

    /// Apply an admin action to the local order book
    ///
    /// Escalation leaves the order disputed and is only recorded in the log.
    pub fn apply(&mut self, order_id: &str, action: OrderAction) -> Result<&Order> {
        let order = self
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| Error::not_found(format!("order {}", order_id)))?;

        if order.status != action.required_status() {
            return Err(Error::validation(format!(
                "cannot {} an order that is {}",
                action, order.status
            )));
        }

        match action {
            OrderAction::Cancel => order.set_status(OrderStatus::Cancelled, Utc::now()),
            OrderAction::ResolveDispute => order.set_status(OrderStatus::Completed, Utc::now()),
            OrderAction::EscalateDispute => {
                warn!(order_id, "dispute escalated");
            }
        }
        info!(order_id, action = action.as_str(), "order action applied");
        Ok(order)
    }

    /// Write the given orders as CSV
    pub fn export_csv<W: Write>(orders: &[&Order], writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        for order in orders {
            csv.serialize(OrderRow {
                id: &order.id,
                user_email: order.user_email.as_deref().unwrap_or_default(),
                order_type: order.order_type.as_str(),
                from_currency: &order.from_currency,
                to_currency: &order.to_currency,
                amount: order.amount.to_string(),
                rate: order.rate.to_string(),
                total_amount: format_money(order.total_amount),
                status: order.status.as_str(),
                payment_method: order.payment_method.as_deref().unwrap_or_default(),
                created_at: order.created_at.to_rfc3339(),
            })
            .map_err(|e| Error::Other(format!("CSV export failed: {}", e)))?;
        }
        csv.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::demo;

    fn book() -> OrderBook {
        OrderBook::new(demo::admin_orders())
    }

    #[test]
    fn test_search_and_status_filter() {
        let book = book();
        assert_eq!(book.search("john.doe", None).len(), 2);
        assert_eq!(book.search("gbp", None).len(), 2);
        assert_eq!(book.search("ord-003", None).len(), 1);

        let active = book.search("", Some(OrderStatus::Active));
        assert!(active.iter().all(|o| o.status == OrderStatus::Active));
        assert_eq!(active.len(), 2);
    }

    #[test]
    fn test_stats() {
        assert_eq!(
            book().stats(),
            OrderStats {
                total: 5,
                active: 2,
                completed: 1,
                disputed: 1
            }
        );
    }

    #[test]
    fn test_actions_respect_status() {
        let mut book = book();
        assert_eq!(
            book.apply("ORD-003", OrderAction::EscalateDispute).unwrap().status,
            OrderStatus::Disputed
        );
        assert_eq!(
            book.apply("ORD-003", OrderAction::ResolveDispute).unwrap().status,
            OrderStatus::Completed
        );
        assert!(book.apply("ORD-003", OrderAction::ResolveDispute).is_err());

        assert_eq!(
            book.apply("ORD-001", OrderAction::Cancel).unwrap().status,
            OrderStatus::Cancelled
        );
        assert!(book.apply("ORD-002", OrderAction::Cancel).unwrap_err().is_validation());
        assert!(matches!(
            book.apply("ORD-999", OrderAction::Cancel),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_export_csv() {
        let book = book();
        let mut out = Vec::new();
        OrderBook::export_csv(&book.search("", Some(OrderStatus::Disputed)), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("id,user_email,type"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("ORD-003,sarah.jones@email.com,sell,USD,EUR,2360"));
        assert!(lines.next().is_none());
    }
}
