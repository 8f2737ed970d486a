//! Sample data
//!
//! Fixed datasets used when a list load fails (so the screen stays
//! populated) and to seed the in-process backend for demo sessions.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::domain::result::Result;
use crate::domain::{
    AlertStatus, AlertType, AuthUser, ComplianceAlert, KycStatus, Notification,
    NotificationType, Order, OrderStatus, OrderType, Permission, Role, Severity, UserProfile,
    WalletBalance,
};
use crate::ports::data_store::{NOTIFICATIONS, ORDERS};
use crate::ports::{Collection, DataStore};

/// User id the sample notifications are addressed to
pub const DEMO_USER_ID: &str = "user1";

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Identity used by demo sessions
pub fn demo_user() -> AuthUser {
    AuthUser::new(DEMO_USER_ID, "demo@peersfx.com").with_display_name("Demo Trader")
}

#[allow(clippy::too_many_arguments)]
fn market_order(
    id: &str,
    user_id: &str,
    user_name: &str,
    rating: i64,
    order_type: OrderType,
    pair: (&str, &str),
    amount: i64,
    rate: Decimal,
    created_at: DateTime<Utc>,
) -> Order {
    let mut order = Order::new(
        id,
        user_id,
        user_name,
        order_type,
        pair.0,
        pair.1,
        Decimal::new(amount, 0),
        rate,
        created_at,
    );
    order.user_rating = Some(Decimal::new(rating, 1));
    order
}

/// Marketplace fallback list (all active)
pub fn fallback_orders() -> Vec<Order> {
    vec![
        market_order(
            "1",
            "user1",
            "John Smith",
            48,
            OrderType::Sell,
            ("USD", "EUR"),
            1000,
            Decimal::new(85, 2),
            at(2024, 1, 15, 10, 30),
        )
        .with_notes("Quick transaction preferred"),
        market_order(
            "2",
            "user2",
            "Sarah Johnson",
            49,
            OrderType::Buy,
            ("EUR", "GBP"),
            500,
            Decimal::new(86, 2),
            at(2024, 1, 15, 9, 15),
        ),
        market_order(
            "3",
            "user3",
            "Mike Chen",
            47,
            OrderType::Sell,
            ("GBP", "USD"),
            750,
            Decimal::new(137, 2),
            at(2024, 1, 15, 8, 45),
        )
        .with_notes("Bank transfer only"),
        market_order(
            "4",
            "user4",
            "Emma Wilson",
            50,
            OrderType::Buy,
            ("USD", "EUR"),
            2000,
            Decimal::new(84, 2),
            at(2024, 1, 15, 7, 20),
        ),
    ]
}

/// Notification center fallback list
pub fn fallback_notifications() -> Vec<Notification> {
    let n = |id: &str, title: &str, message: &str, t: NotificationType, read: bool, when| {
        let mut notification = Notification::new(id, DEMO_USER_ID, title, message, t, when);
        notification.is_read = read;
        notification
    };

    vec![
        n(
            "1",
            "Order Matched!",
            "Your sell order for 1000 USD has been matched with John Smith.",
            NotificationType::Success,
            false,
            at(2024, 1, 15, 10, 30),
        )
        .with_action_url("/marketplace"),
        n(
            "2",
            "KYC Verification Approved",
            "Your identity verification has been approved. You can now trade with higher limits.",
            NotificationType::Success,
            false,
            at(2024, 1, 15, 9, 15),
        ),
        n(
            "3",
            "New Message",
            "Sarah Johnson sent you a message regarding your EUR exchange order.",
            NotificationType::Info,
            true,
            at(2024, 1, 15, 8, 45),
        ),
        n(
            "4",
            "Order Expired",
            "Your buy order for 500 EUR has expired due to no matches found.",
            NotificationType::Warning,
            true,
            at(2024, 1, 14, 15, 20),
        ),
        n(
            "5",
            "Transaction Completed",
            "Your exchange of 750 GBP to USD has been completed successfully.",
            NotificationType::Success,
            true,
            at(2024, 1, 14, 12, 10),
        ),
        n(
            "6",
            "Security Alert",
            "New login detected from a different device. If this wasn't you, please secure your account.",
            NotificationType::Error,
            false,
            at(2024, 1, 14, 8, 30),
        ),
    ]
}

/// Admin user roster
pub fn admin_users() -> Vec<UserProfile> {
    let u = |id: &str,
             email: &str,
             name: &str,
             kyc: KycStatus,
             verified: bool,
             active: bool,
             country: &str,
             phone: &str,
             orders: u32,
             volume: i64,
             last_login: &str,
             created: &str| UserProfile {
        id: id.to_string(),
        email: email.to_string(),
        display_name: name.to_string(),
        kyc_status: kyc,
        is_verified: verified,
        is_active: active,
        country: country.to_string(),
        phone_number: phone.to_string(),
        total_orders: orders,
        total_volume: Decimal::new(volume, 0),
        last_login: last_login.to_string(),
        created_at: created.to_string(),
    };

    vec![
        u("1", "john.doe@email.com", "John Doe", KycStatus::Approved, true, true,
          "United States", "+1-555-0123", 15, 45_000, "2024-01-15 14:30", "2023-12-01"),
        u("2", "jane.smith@email.com", "Jane Smith", KycStatus::Pending, false, true,
          "Canada", "+1-416-555-0456", 3, 8_500, "2024-01-15 12:15", "2024-01-10"),
        u("3", "mike.wilson@email.com", "Mike Wilson", KycStatus::Rejected, false, false,
          "United Kingdom", "+44-20-7946-0958", 0, 0, "2024-01-12 09:45", "2024-01-08"),
        u("4", "sarah.jones@email.com", "Sarah Jones", KycStatus::Approved, true, true,
          "Australia", "+61-2-9876-5432", 28, 125_000, "2024-01-15 16:20", "2023-11-15"),
        u("5", "alex.brown@email.com", "Alex Brown", KycStatus::Pending, false, true,
          "Germany", "+49-30-12345678", 7, 22_000, "2024-01-15 11:30", "2023-12-20"),
    ]
}

/// Admin order book (every status represented)
pub fn admin_orders() -> Vec<Order> {
    let o = |id: &str,
             user_id: &str,
             email: &str,
             order_type: OrderType,
             pair: (&str, &str),
             amount: i64,
             rate: Decimal,
             total: i64,
             status: OrderStatus,
             payment: &str,
             created: DateTime<Utc>,
             updated: DateTime<Utc>,
             matched_with: Option<&str>| {
        let mut order = Order::new(
            id,
            user_id,
            email.split('@').next().unwrap_or_default(),
            order_type,
            pair.0,
            pair.1,
            Decimal::new(amount, 0),
            rate,
            created,
        )
        .with_email(email);
        order.total_amount = Decimal::new(total, 0);
        order.status = status;
        order.payment_method = Some(payment.to_string());
        order.updated_at = Some(updated);
        order.matched_with = matched_with.map(str::to_string);
        order
    };

    vec![
        o("ORD-001", "1", "john.doe@email.com", OrderType::Sell, ("USD", "EUR"), 1500,
          Decimal::new(85, 2), 1275, OrderStatus::Active, "Bank Transfer",
          at(2024, 1, 15, 14, 30), at(2024, 1, 15, 14, 30), None),
        o("ORD-002", "2", "jane.smith@email.com", OrderType::Buy, ("EUR", "USD"), 2000,
          Decimal::new(118, 2), 2360, OrderStatus::Completed, "PayPal",
          at(2024, 1, 15, 12, 15), at(2024, 1, 15, 16, 45), Some("ORD-003")),
        o("ORD-003", "4", "sarah.jones@email.com", OrderType::Sell, ("USD", "EUR"), 2360,
          Decimal::new(847, 3), 2000, OrderStatus::Disputed, "Bank Transfer",
          at(2024, 1, 15, 11, 20), at(2024, 1, 15, 17, 30), Some("ORD-002")),
        o("ORD-004", "5", "alex.brown@email.com", OrderType::Buy, ("GBP", "USD"), 800,
          Decimal::new(137, 2), 1096, OrderStatus::Active, "Wise",
          at(2024, 1, 15, 10, 45), at(2024, 1, 15, 10, 45), None),
        o("ORD-005", "1", "john.doe@email.com", OrderType::Sell, ("EUR", "GBP"), 1200,
          Decimal::new(86, 2), 1032, OrderStatus::Cancelled, "Bank Transfer",
          at(2024, 1, 14, 16, 20), at(2024, 1, 14, 18, 0), None),
    ]
}

/// Open compliance alerts shown on first load
pub fn compliance_alerts() -> Vec<ComplianceAlert> {
    vec![
        ComplianceAlert {
            id: "alert-001".into(),
            alert_type: AlertType::Transaction,
            severity: Severity::High,
            title: "Large Transaction Alert".into(),
            description: "Transaction exceeds $10,000 threshold".into(),
            user_id: Some("user-123".into()),
            transaction_id: Some("tx-456".into()),
            timestamp: at(2024, 1, 18, 10, 30),
            status: AlertStatus::Investigating,
        },
        ComplianceAlert {
            id: "alert-002".into(),
            alert_type: AlertType::Aml,
            severity: Severity::Critical,
            title: "Potential Money Laundering".into(),
            description: "Rapid succession of transactions with pattern matching".into(),
            user_id: Some("user-789".into()),
            transaction_id: None,
            timestamp: at(2024, 1, 18, 9, 15),
            status: AlertStatus::Open,
        },
        ComplianceAlert {
            id: "alert-003".into(),
            alert_type: AlertType::Kyc,
            severity: Severity::Medium,
            title: "KYC Document Expired".into(),
            description: "User ID document requires renewal".into(),
            user_id: Some("user-456".into()),
            transaction_id: None,
            timestamp: at(2024, 1, 18, 8, 45),
            status: AlertStatus::Open,
        },
    ]
}

/// Built-in role catalog
pub fn roles() -> Vec<Role> {
    let r = |id: &str, name: &str, description: &str, perms: &[&str], users: u32, system: bool| Role {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        permissions: perms.iter().map(|p| p.to_string()).collect(),
        user_count: users,
        created_at: "2024-01-01".to_string(),
        is_system: system,
    };

    vec![
        r("role-1", "Super Admin", "Full system access with all permissions", &["all"], 2, true),
        r("role-2", "Compliance Officer",
          "Access to compliance monitoring, reporting, and investigations",
          &["compliance.view", "compliance.investigate", "reports.generate", "users.view"], 5, false),
        r("role-3", "Operations Manager",
          "Manage day-to-day operations, user support, and order management",
          &["orders.manage", "users.manage", "support.access", "analytics.view"], 8, false),
        r("role-4", "Customer Support",
          "Handle customer inquiries and basic account management",
          &["users.view", "orders.view", "support.access", "tickets.manage"], 12, false),
        r("role-5", "Risk Analyst", "Monitor transactions for risk and fraud detection",
          &["transactions.monitor", "risk.assess", "alerts.manage", "reports.view"], 3, false),
        r("role-6", "Auditor", "Read-only access for audit and compliance review",
          &["audit.view", "reports.view", "logs.view"], 2, false),
    ]
}

/// Permission catalog
pub fn permissions() -> Vec<Permission> {
    vec![
        Permission::new("users.view", "View Users", "User Management", "View user profiles and information"),
        Permission::new("users.manage", "Manage Users", "User Management", "Create, edit, suspend, and delete users"),
        Permission::new("users.kyc", "KYC Management", "User Management", "Review and approve KYC documents"),
        Permission::new("orders.view", "View Orders", "Order Management", "View all platform orders"),
        Permission::new("orders.manage", "Manage Orders", "Order Management", "Cancel, modify, and resolve order disputes"),
        Permission::new("compliance.view", "View Compliance", "Compliance", "Access compliance dashboard and metrics"),
        Permission::new("compliance.investigate", "Investigate Alerts", "Compliance", "Investigate and resolve compliance alerts"),
        Permission::new("compliance.configure", "Configure Compliance", "Compliance", "Modify compliance thresholds and rules"),
        Permission::new("reports.view", "View Reports", "Reporting", "Access and view generated reports"),
        Permission::new("reports.generate", "Generate Reports", "Reporting", "Create and download regulatory reports"),
        Permission::new("analytics.view", "View Analytics", "Analytics", "Access platform analytics and metrics"),
        Permission::new("system.settings", "System Settings", "System", "Modify system configuration and settings"),
        Permission::new("audit.view", "View Audit Logs", "System", "Access system audit logs"),
        Permission::new("logs.view", "View Logs", "System", "Access application event logs"),
        Permission::new("support.access", "Customer Support", "Support", "Access customer support tools"),
        Permission::new("tickets.manage", "Manage Tickets", "Support", "Create and resolve support tickets"),
        Permission::new("transactions.monitor", "Monitor Transactions", "Risk Management", "Monitor transactions for suspicious activity"),
        Permission::new("risk.assess", "Risk Assessment", "Risk Management", "Assess and score user and transaction risk"),
        Permission::new("alerts.manage", "Manage Alerts", "Risk Management", "Handle risk and compliance alerts"),
    ]
}

/// Wallet balances for the demo user
pub fn wallet_balances() -> Vec<WalletBalance> {
    let b = |currency: &str, cents: i64, symbol: &str| WalletBalance {
        currency: currency.to_string(),
        balance: Decimal::new(cents, 2),
        symbol: symbol.to_string(),
    };
    vec![b("USD", 125_050, "$"), b("EUR", 89_025, "€"), b("GBP", 65_075, "£")]
}

/// Load the sample orders and notifications into a store
pub async fn seed_store(store: &dyn DataStore) -> Result<()> {
    let orders: Collection<Order> = Collection::new(store, ORDERS);
    for order in fallback_orders() {
        orders.create(&order).await?;
    }
    let notifications: Collection<Notification> = Collection::new(store, NOTIFICATIONS);
    for notification in fallback_notifications() {
        notifications.create(&notification).await?;
    }
    Ok(())
}
