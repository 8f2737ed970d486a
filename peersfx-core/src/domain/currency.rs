//! Currencies and the static market rate table

use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

/// A currency the order form offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
}

/// Currencies selectable in the order form and marketplace filters
pub const CURRENCIES: &[CurrencyInfo] = &[
    CurrencyInfo { code: "USD", name: "US Dollar", symbol: "$" },
    CurrencyInfo { code: "EUR", name: "Euro", symbol: "€" },
    CurrencyInfo { code: "GBP", name: "British Pound", symbol: "£" },
];

/// Look up display info for a currency code
pub fn currency_info(code: &str) -> Option<&'static CurrencyInfo> {
    CURRENCIES.iter().find(|c| c.code == code)
}

/// Fixed market rate for a pair, 0 when the pair is unknown.
///
/// Only six directed pairs are quoted. The table is not symmetric
/// (USD-EUR 0.85 but EUR-USD 1.18).
pub fn market_rate(from: &str, to: &str) -> Decimal {
    match (from, to) {
        ("USD", "EUR") => Decimal::new(85, 2),
        ("USD", "GBP") => Decimal::new(73, 2),
        ("EUR", "USD") => Decimal::new(118, 2),
        ("EUR", "GBP") => Decimal::new(86, 2),
        ("GBP", "USD") => Decimal::new(137, 2),
        ("GBP", "EUR") => Decimal::new(116, 2),
        _ => Decimal::ZERO,
    }
}

/// Every quoted pair, in table order
pub fn quoted_pairs() -> Vec<(&'static str, &'static str, Decimal)> {
    const PAIRS: &[(&str, &str)] = &[
        ("USD", "EUR"),
        ("USD", "GBP"),
        ("EUR", "USD"),
        ("EUR", "GBP"),
        ("GBP", "USD"),
        ("GBP", "EUR"),
    ];
    PAIRS
        .iter()
        .map(|(from, to)| (*from, *to, market_rate(from, to)))
        .collect()
}

/// Normalize currency code to uppercase
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// ISO 4217 shape check (three uppercase letters)
pub fn is_valid_code(code: &str) -> bool {
    static CODE_RE: OnceLock<Regex> = OnceLock::new();
    CODE_RE
        .get_or_init(|| Regex::new(r"^[A-Z]{3}$").expect("static regex"))
        .is_match(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_rate_lookup() {
        assert_eq!(market_rate("USD", "EUR"), Decimal::new(85, 2));
        assert_eq!(market_rate("GBP", "USD"), Decimal::new(137, 2));
        assert_eq!(market_rate("USD", "USD"), Decimal::ZERO);
        assert_eq!(market_rate("USD", "JPY"), Decimal::ZERO);
        assert_eq!(market_rate("", "EUR"), Decimal::ZERO);
    }

    #[test]
    fn test_quoted_pairs_has_six_entries() {
        let pairs = quoted_pairs();
        assert_eq!(pairs.len(), 6);
        assert!(pairs.iter().all(|(_, _, rate)| !rate.is_zero()));
    }

    #[test]
    fn test_code_validation() {
        assert!(is_valid_code("USD"));
        assert!(!is_valid_code("usd"));
        assert!(!is_valid_code("US"));
        assert_eq!(normalize_code(" eur "), "EUR");
        assert!(is_valid_code(&normalize_code(" eur ")));
    }

    #[test]
    fn test_currency_info() {
        assert_eq!(currency_info("GBP").map(|c| c.symbol), Some("£"));
        assert!(currency_info("JPY").is_none());
    }
}
