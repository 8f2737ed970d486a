//! Compliance monitor - threshold screening and alert handling

use std::io::Write;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::domain::ids::generate_id;
use crate::domain::result::{Error, Result};
use crate::domain::{
    AlertStatus, AlertType, ComplianceAlert, ComplianceThresholds, KycStatus, Order, OrderStatus,
    Severity, UserProfile,
};

/// What the screening rules need to know about the order's owner
#[derive(Debug, Clone, PartialEq)]
pub struct UserActivity {
    pub kyc_status: KycStatus,
    pub is_verified: bool,
    /// Orders placed in the hour before the screened one
    pub orders_last_hour: u32,
    /// Volume placed in the day before the screened one
    pub daily_volume: Decimal,
}

impl UserActivity {
    /// Build from the user's profile and their other orders
    ///
    /// Cancelled orders do not count toward velocity or volume.
    pub fn from_orders(profile: &UserProfile, orders: &[Order], now: DateTime<Utc>) -> Self {
        let mine = orders
            .iter()
            .filter(|o| o.user_id == profile.id && o.status != OrderStatus::Cancelled);

        let mut orders_last_hour = 0;
        let mut daily_volume = Decimal::ZERO;
        for order in mine {
            let age = now - order.created_at;
            if age < Duration::zero() {
                continue;
            }
            if age <= Duration::hours(1) {
                orders_last_hour += 1;
            }
            if age <= Duration::hours(24) {
                daily_volume = daily_volume.saturating_add(order.amount);
            }
        }

        Self {
            kyc_status: profile.kyc_status,
            is_verified: profile.is_verified,
            orders_last_hour,
            daily_volume,
        }
    }
}

fn alert(
    alert_type: AlertType,
    severity: Severity,
    title: &str,
    description: String,
    order: &Order,
    now: DateTime<Utc>,
) -> ComplianceAlert {
    ComplianceAlert {
        id: generate_id("alert"),
        alert_type,
        severity,
        title: title.to_string(),
        description,
        user_id: Some(order.user_id.clone()),
        transaction_id: Some(order.id.clone()),
        timestamp: now,
        status: AlertStatus::Open,
    }
}

/// Screen one order against the thresholds
pub fn evaluate_order(
    order: &Order,
    activity: &UserActivity,
    thresholds: &ComplianceThresholds,
    now: DateTime<Utc>,
) -> Vec<ComplianceAlert> {
    let amount = order.amount;
    let mut alerts = Vec::new();

    if amount > thresholds.ctr_threshold {
        alerts.push(alert(
            AlertType::Transaction,
            Severity::High,
            "Large Transaction Alert",
            format!("Transaction exceeds ${} threshold", thresholds.ctr_threshold),
            order,
            now,
        ));
    }
    if amount >= thresholds.sar_threshold
        && activity.orders_last_hour >= thresholds.velocity_orders_per_hour
    {
        alerts.push(alert(
            AlertType::Suspicious,
            Severity::Medium,
            "Velocity Alert",
            format!(
                "{} orders in the last hour before a {} {} order",
                activity.orders_last_hour, amount, order.from_currency
            ),
            order,
            now,
        ));
    }
    let projected_volume = activity.daily_volume.saturating_add(amount);
    if projected_volume > thresholds.daily_transaction_limit {
        alerts.push(alert(
            AlertType::Aml,
            Severity::Critical,
            "Daily Limit Exceeded",
            format!(
                "Daily volume would reach {} against a limit of {}",
                projected_volume,
                thresholds.daily_transaction_limit
            ),
            order,
            now,
        ));
    }
    if amount > thresholds.basic_kyc_threshold && activity.kyc_status != KycStatus::Approved {
        alerts.push(alert(
            AlertType::Kyc,
            Severity::Medium,
            "KYC Required",
            format!(
                "Order above {} from a user whose KYC is {}",
                thresholds.basic_kyc_threshold,
                activity.kyc_status.as_str()
            ),
            order,
            now,
        ));
    }
    if amount > thresholds.enhanced_kyc_threshold && !activity.is_verified {
        alerts.push(alert(
            AlertType::Kyc,
            Severity::High,
            "Enhanced Verification Required",
            format!(
                "Order above {} from an unverified user",
                thresholds.enhanced_kyc_threshold
            ),
            order,
            now,
        ));
    }

    alerts
}

#[derive(Serialize)]
struct AlertRow<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    alert_type: &'a str,
    severity: &'a str,
    title: &'a str,
    description: &'a str,
    user_id: &'a str,
    transaction_id: &'a str,
    timestamp: String,
    status: &'a str,
}

/// `{report}_report_{YYYY-MM-DD}.csv`, spaces folded to underscores
pub fn report_file_name(report_name: &str, date: DateTime<Utc>) -> String {
    let slug = report_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase();
    format!("{}_report_{}.csv", slug, date.format("%Y-%m-%d"))
}

pub struct ComplianceMonitor {
    thresholds: ComplianceThresholds,
    alerts: Vec<ComplianceAlert>,
}

impl ComplianceMonitor {
    pub fn new(thresholds: ComplianceThresholds, alerts: Vec<ComplianceAlert>) -> Self {
        Self { thresholds, alerts }
    }

    pub fn thresholds(&self) -> &ComplianceThresholds {
        &self.thresholds
    }

    pub fn update_thresholds(&mut self, thresholds: ComplianceThresholds) -> Result<()> {
        thresholds.validate().map_err(Error::validation)?;
        self.thresholds = thresholds;
        Ok(())
    }

    /// Newest first
    pub fn alerts(&self) -> Vec<&ComplianceAlert> {
        let mut alerts: Vec<&ComplianceAlert> = self.alerts.iter().collect();
        alerts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        alerts
    }

    pub fn open_alerts(&self) -> Vec<&ComplianceAlert> {
        self.alerts()
            .into_iter()
            .filter(|a| !a.status.is_terminal())
            .collect()
    }

    /// Screen an order and keep whatever alerts it raises
    pub fn screen(&mut self, order: &Order, activity: &UserActivity) -> Vec<ComplianceAlert> {
        let raised = evaluate_order(order, activity, &self.thresholds, Utc::now());
        if !raised.is_empty() {
            info!(order_id = %order.id, alerts = raised.len(), "compliance alerts raised");
        }
        self.alerts.extend(raised.iter().cloned());
        raised
    }

    pub fn set_status(&mut self, alert_id: &str, status: AlertStatus) -> Result<&ComplianceAlert> {
        let alert = self
            .alerts
            .iter_mut()
            .find(|a| a.id == alert_id)
            .ok_or_else(|| Error::not_found(format!("alert {}", alert_id)))?;
        if !alert.status.can_transition_to(status) {
            return Err(Error::validation(format!(
                "alert {} cannot move from {} to {}",
                alert_id, alert.status, status
            )));
        }
        alert.status = status;
        Ok(alert)
    }

    /// Write every alert, newest first, as CSV
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        for a in self.alerts() {
            csv.serialize(AlertRow {
                id: &a.id,
                alert_type: a.alert_type.as_str(),
                severity: a.severity.as_str(),
                title: &a.title,
                description: &a.description,
                user_id: a.user_id.as_deref().unwrap_or_default(),
                transaction_id: a.transaction_id.as_deref().unwrap_or_default(),
                timestamp: a.timestamp.to_rfc3339(),
                status: a.status.as_str(),
            })
            .map_err(|e| Error::Other(format!("CSV export failed: {}", e)))?;
        }
        csv.flush()?;
        Ok(())
    }
}
