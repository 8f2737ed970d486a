//! Summaries behind the admin analytics page

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{Order, OrderStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyVolume {
    pub currency: String,
    pub volume: Decimal,
    pub orders: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserVolume {
    pub user_id: String,
    pub user_name: String,
    pub volume: Decimal,
    pub orders: usize,
}

/// Volume per source currency, largest first. Cancelled orders never
/// traded and are left out.
pub fn volume_by_currency(orders: &[Order]) -> Vec<CurrencyVolume> {
    let mut by_currency: BTreeMap<&str, (Decimal, usize)> = BTreeMap::new();
    for order in orders.iter().filter(|o| o.status != OrderStatus::Cancelled) {
        let entry = by_currency
            .entry(order.from_currency.as_str())
            .or_insert((Decimal::ZERO, 0));
        entry.0 = entry.0.saturating_add(order.amount);
        entry.1 += 1;
    }

    let mut volumes: Vec<CurrencyVolume> = by_currency
        .into_iter()
        .map(|(currency, (volume, orders))| CurrencyVolume {
            currency: currency.to_string(),
            volume,
            orders,
        })
        .collect();
    volumes.sort_by(|a, b| b.volume.cmp(&a.volume));
    volumes
}

/// Order count for every status, zero counts included
pub fn counts_by_status(orders: &[Order]) -> Vec<(OrderStatus, usize)> {
    OrderStatus::ALL
        .into_iter()
        .map(|status| (status, orders.iter().filter(|o| o.status == status).count()))
        .collect()
}

/// Users ranked by traded volume, ties broken by user id
pub fn top_users(orders: &[Order], limit: usize) -> Vec<UserVolume> {
    let mut by_user: BTreeMap<&str, UserVolume> = BTreeMap::new();
    for order in orders.iter().filter(|o| o.status != OrderStatus::Cancelled) {
        let entry = by_user
            .entry(order.user_id.as_str())
            .or_insert_with(|| UserVolume {
                user_id: order.user_id.clone(),
                user_name: order.user_name.clone(),
                volume: Decimal::ZERO,
                orders: 0,
            });
        entry.volume = entry.volume.saturating_add(order.amount);
        entry.orders += 1;
    }

    let mut users: Vec<UserVolume> = by_user.into_values().collect();
    users.sort_by(|a, b| b.volume.cmp(&a.volume));
    users.truncate(limit);
    users
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::demo::admin_orders;

    #[test]
    fn test_volume_skips_cancelled() {
        let orders = admin_orders();
        let volumes = volume_by_currency(&orders);
        let total: usize = volumes.iter().map(|v| v.orders).sum();
        assert_eq!(total, 4);
        assert!(volumes.windows(2).all(|w| w[0].volume >= w[1].volume));
    }

    #[test]
    fn test_counts_cover_every_status() {
        let orders = admin_orders();
        let counts = counts_by_status(&orders);
        assert_eq!(counts.len(), OrderStatus::ALL.len());
        assert_eq!(counts.iter().map(|(_, n)| n).sum::<usize>(), orders.len());
        assert!(counts.contains(&(OrderStatus::Active, 2)));
    }

    #[test]
    fn test_top_users_limit() {
        let orders = admin_orders();
        let top = top_users(&orders, 2);
        assert_eq!(top.len(), 2);
        assert!(top[0].volume >= top[1].volume);
        assert!(top_users(&[], 5).is_empty());
    }
}
