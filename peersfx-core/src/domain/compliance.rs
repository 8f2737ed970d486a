//! Compliance alerts and monitoring thresholds

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Aml,
    Kyc,
    Transaction,
    Suspicious,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Aml => "aml",
            AlertType::Kyc => "kyc",
            AlertType::Transaction => "transaction",
            AlertType::Suspicious => "suspicious",
        }
    }
}

/// Ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Open,
    Investigating,
    Resolved,
    FalsePositive,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Open => "open",
            AlertStatus::Investigating => "investigating",
            AlertStatus::Resolved => "resolved",
            AlertStatus::FalsePositive => "false_positive",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AlertStatus::Resolved | AlertStatus::FalsePositive)
    }

    /// open -> investigating -> resolved | false_positive, and open may
    /// close directly. Terminal states never move.
    pub fn can_transition_to(&self, next: AlertStatus) -> bool {
        use AlertStatus::*;
        matches!(
            (self, next),
            (Open, Investigating)
                | (Open, Resolved)
                | (Open, FalsePositive)
                | (Investigating, Resolved)
                | (Investigating, FalsePositive)
        )
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AlertStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(AlertStatus::Open),
            "investigating" => Ok(AlertStatus::Investigating),
            "resolved" => Ok(AlertStatus::Resolved),
            "false_positive" => Ok(AlertStatus::FalsePositive),
            other => Err(format!("unknown alert status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceAlert {
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub status: AlertStatus,
}

/// Monitoring thresholds, editable from the admin console
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComplianceThresholds {
    /// Currency Transaction Report threshold
    pub ctr_threshold: Decimal,
    /// Suspicious Activity Report threshold
    pub sar_threshold: Decimal,
    pub daily_transaction_limit: Decimal,
    pub basic_kyc_threshold: Decimal,
    pub enhanced_kyc_threshold: Decimal,
    pub document_expiry_alert_days: u32,
    /// Orders per hour before velocity monitoring flags a user
    pub velocity_orders_per_hour: u32,
}

impl Default for ComplianceThresholds {
    fn default() -> Self {
        Self {
            ctr_threshold: Decimal::new(10_000, 0),
            sar_threshold: Decimal::new(5_000, 0),
            daily_transaction_limit: Decimal::new(50_000, 0),
            basic_kyc_threshold: Decimal::new(1_000, 0),
            enhanced_kyc_threshold: Decimal::new(10_000, 0),
            document_expiry_alert_days: 30,
            velocity_orders_per_hour: 5,
        }
    }
}

impl ComplianceThresholds {
    pub fn validate(&self) -> Result<(), &'static str> {
        let values = [
            self.ctr_threshold,
            self.sar_threshold,
            self.daily_transaction_limit,
            self.basic_kyc_threshold,
            self.enhanced_kyc_threshold,
        ];
        if values.iter().any(|v| *v <= Decimal::ZERO) {
            return Err("thresholds must be positive");
        }
        if self.basic_kyc_threshold > self.enhanced_kyc_threshold {
            return Err("basic KYC threshold cannot exceed the enhanced threshold");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        assert!(AlertStatus::Open.can_transition_to(AlertStatus::Investigating));
        assert!(AlertStatus::Investigating.can_transition_to(AlertStatus::FalsePositive));
        assert!(!AlertStatus::Resolved.can_transition_to(AlertStatus::Open));
        assert!(!AlertStatus::Investigating.can_transition_to(AlertStatus::Open));
        assert!(AlertStatus::FalsePositive.is_terminal());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::Low < Severity::Medium);
    }

    #[test]
    fn test_threshold_validation() {
        let mut thresholds = ComplianceThresholds::default();
        assert!(thresholds.validate().is_ok());

        thresholds.basic_kyc_threshold = Decimal::new(20_000, 0);
        assert!(thresholds.validate().is_err());
    }

    #[test]
    fn test_false_positive_wire_name() {
        assert_eq!(
            serde_json::to_value(AlertStatus::FalsePositive).unwrap(),
            "false_positive"
        );
    }
}
