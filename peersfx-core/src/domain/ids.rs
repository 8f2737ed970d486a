//! Record id generation
//!
//! Ids are `<prefix>_<unix millis>_<9 base36 chars>`, e.g.
//! `order_1705314600000_k3j9x0a1b`. They are created client-side before the
//! record is handed to the data store.

use chrono::Utc;
use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

/// Generate a new id with the given prefix
pub fn generate_id(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}_{}_{}", prefix, millis, suffix)
}

pub fn order_id() -> String {
    generate_id("order")
}

pub fn kyc_id() -> String {
    generate_id("kyc")
}

pub fn notification_id() -> String {
    generate_id("notif")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_shape() {
        let id = order_id();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "order");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(parts[2].bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn test_ids_are_distinct() {
        let a = notification_id();
        let b = notification_id();
        assert_ne!(a, b);
        assert!(kyc_id().starts_with("kyc_"));
    }
}
