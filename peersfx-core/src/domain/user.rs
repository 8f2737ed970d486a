//! User domain models

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The signed-in user as delivered by the auth service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl AuthUser {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Name shown on orders: display name, else the email local part,
    /// else "Anonymous"
    pub fn public_name(&self) -> String {
        if let Some(name) = self.display_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }
        match self.email.split('@').next() {
            Some(local) if !local.is_empty() => local.to_string(),
            _ => "Anonymous".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KycStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl KycStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KycStatus::Pending => "pending",
            KycStatus::Approved => "approved",
            KycStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for KycStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KycStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(KycStatus::Pending),
            "approved" => Ok(KycStatus::Approved),
            "rejected" => Ok(KycStatus::Rejected),
            other => Err(format!("unknown KYC status: {}", other)),
        }
    }
}

/// A platform user as seen from the admin console
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub kyc_status: KycStatus,
    pub is_verified: bool,
    pub is_active: bool,
    pub country: String,
    pub phone_number: String,
    pub total_orders: u32,
    pub total_volume: Decimal,
    #[serde(default)]
    pub last_login: String,
    #[serde(default)]
    pub created_at: String,
}

impl UserProfile {
    /// Case-insensitive match against email and display name
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.email.to_lowercase().contains(&term)
            || self.display_name.to_lowercase().contains(&term)
    }
}

/// Loose email shape check
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static regex"))
        .is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_name_fallbacks() {
        let user = AuthUser::new("u1", "jane.doe@example.com");
        assert_eq!(user.public_name(), "jane.doe");

        let named = user.clone().with_display_name("Jane Doe");
        assert_eq!(named.public_name(), "Jane Doe");

        let anonymous = AuthUser::new("u2", "");
        assert_eq!(anonymous.public_name(), "Anonymous");
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("john.doe@email.com"));
        assert!(!is_valid_email("john.doe"));
        assert!(!is_valid_email("a b@c.d"));
    }

    #[test]
    fn test_kyc_status_parsing() {
        assert_eq!("APPROVED".parse::<KycStatus>(), Ok(KycStatus::Approved));
        assert!("unknown".parse::<KycStatus>().is_err());
    }
}
