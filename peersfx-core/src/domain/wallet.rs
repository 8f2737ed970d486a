//! Wallet balances

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::currency::market_rate;
use super::order::compute_total;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalance {
    pub currency: String,
    pub balance: Decimal,
    pub symbol: String,
}

/// Wallet total expressed in one currency
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSummary {
    pub currency: String,
    pub total: Decimal,
    /// Balances with no quoted rate into `currency`; left out of `total`
    pub unconverted: Vec<String>,
}

/// Sum all balances into `currency` using the market rate table
///
/// The total saturates at `Decimal::MAX`; a balance whose conversion
/// overflows is reported as unconverted.
pub fn summarize(balances: &[WalletBalance], currency: &str) -> WalletSummary {
    let mut total = Decimal::ZERO;
    let mut unconverted = Vec::new();

    for b in balances {
        if b.currency == currency {
            total = total.saturating_add(b.balance);
            continue;
        }
        let rate = market_rate(&b.currency, currency);
        match compute_total(b.balance, rate) {
            Some(converted) if !rate.is_zero() => total = total.saturating_add(converted),
            _ => unconverted.push(b.currency.clone()),
        }
    }

    WalletSummary {
        currency: currency.to_string(),
        total,
        unconverted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance(currency: &str, cents: i64) -> WalletBalance {
        WalletBalance {
            currency: currency.into(),
            balance: Decimal::new(cents, 2),
            symbol: String::new(),
        }
    }

    #[test]
    fn test_summarize_in_usd() {
        let balances = vec![balance("USD", 125050), balance("EUR", 10000)];
        let summary = summarize(&balances, "USD");
        // 1250.50 + 100 * 1.18
        assert_eq!(summary.total, Decimal::new(136850, 2));
        assert!(summary.unconverted.is_empty());
    }

    #[test]
    fn test_huge_balances_do_not_overflow() {
        let huge = |currency: &str| WalletBalance {
            currency: currency.into(),
            balance: Decimal::MAX,
            symbol: String::new(),
        };
        let summary = summarize(&[huge("USD"), huge("USD"), huge("EUR")], "USD");
        assert_eq!(summary.total, Decimal::MAX);
        // MAX x 1.18 is out of range
        assert_eq!(summary.unconverted, vec!["EUR".to_string()]);
    }

    #[test]
    fn test_unquoted_currency_is_reported() {
        let balances = vec![balance("USD", 100), balance("JPY", 5000)];
        let summary = summarize(&balances, "USD");
        assert_eq!(summary.total, Decimal::new(100, 2));
        assert_eq!(summary.unconverted, vec!["JPY".to_string()]);
    }
}
