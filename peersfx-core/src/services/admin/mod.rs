//! Admin console
//!
//! Every section works on a local copy of its dataset. Actions flip
//! statuses in that copy; nothing is sent to the remote admin API.

pub mod analytics;
pub mod compliance;
pub mod orders;
pub mod roles;
pub mod settings;
pub mod users;

use serde::Serialize;

use crate::adapters::demo;
use crate::config::Config;
use crate::domain::result::{Error, Result};
use crate::domain::{ComplianceAlert, OrderStatus};

pub use analytics::{counts_by_status, top_users, volume_by_currency, CurrencyVolume, UserVolume};
pub use compliance::{evaluate_order, report_file_name, ComplianceMonitor, UserActivity};
pub use orders::{OrderAction, OrderBook, OrderStats};
pub use roles::RoleCatalog;
pub use settings::{default_settings, SettingKind, SettingsRegistry, SystemSetting};
pub use users::{UserAction, UserDirectory, UserStats};

const TOP_USERS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub volume_by_currency: Vec<CurrencyVolume>,
    pub orders_by_status: Vec<(OrderStatus, usize)>,
    pub top_users: Vec<UserVolume>,
}

/// Dashboard tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverview {
    pub users: UserStats,
    pub orders: OrderStats,
    pub open_alerts: usize,
}

pub struct AdminConsole {
    pub users: UserDirectory,
    pub orders: OrderBook,
    pub compliance: ComplianceMonitor,
    pub roles: RoleCatalog,
    pub settings: SettingsRegistry,
}

impl AdminConsole {
    /// Console over the bundled sample data, with thresholds and platform
    /// settings taken from the config
    pub fn demo(config: &Config) -> Self {
        Self {
            users: UserDirectory::new(demo::admin_users()),
            orders: OrderBook::new(demo::admin_orders()),
            compliance: ComplianceMonitor::new(
                config.compliance.clone(),
                demo::compliance_alerts(),
            ),
            roles: RoleCatalog::new(demo::roles(), demo::permissions()),
            settings: SettingsRegistry::with_overrides(&config.platform),
        }
    }

    pub fn overview(&self) -> AdminOverview {
        AdminOverview {
            users: self.users.stats(),
            orders: self.orders.stats(),
            open_alerts: self.compliance.open_alerts().len(),
        }
    }

    pub fn analytics(&self) -> AnalyticsSummary {
        let orders = self.orders.orders();
        AnalyticsSummary {
            volume_by_currency: volume_by_currency(orders),
            orders_by_status: counts_by_status(orders),
            top_users: top_users(orders, TOP_USERS),
        }
    }

    /// Screen a stored order against its owner's profile and other orders
    ///
    /// Activity is measured up to the order's creation time.
    pub fn screen_order(&mut self, order_id: &str) -> Result<Vec<ComplianceAlert>> {
        let order = self
            .orders
            .get(order_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("order {}", order_id)))?;
        let profile = self
            .users
            .get(&order.user_id)
            .ok_or_else(|| Error::not_found(format!("user {}", order.user_id)))?;

        let others: Vec<_> = self
            .orders
            .orders()
            .iter()
            .filter(|o| o.id != order.id)
            .cloned()
            .collect();
        let activity = UserActivity::from_orders(profile, &others, order.created_at);
        Ok(self.compliance.screen(&order, &activity))
    }
}
