//! Configuration management
//!
//! Compatible with the desktop app settings.json format:
//! ```json
//! {
//!   "app": { "demoMode": false, ... },
//!   "marketplace": { "orderLimit": 100 },
//!   "notifications": { "limit": 50, "syncMutations": false },
//!   "kyc": { "maxDocumentBytes": 10485760 },
//!   "compliance": { "ctrThreshold": "10000", ... },
//!   "platform": { "platform_fee_percentage": "2.5", ... }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::kyc::MAX_DOCUMENT_BYTES;
use crate::domain::ComplianceThresholds;

pub const SETTINGS_FILE: &str = "settings.json";

const DEFAULT_ORDER_LIMIT: usize = 100;
const DEFAULT_NOTIFICATION_LIMIT: usize = 50;

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(default)]
    marketplace: MarketplaceSettings,
    #[serde(default)]
    notifications: NotificationSettings,
    #[serde(default)]
    kyc: KycSettings,
    #[serde(default)]
    compliance: ComplianceThresholds,
    /// Saved values of the admin system settings, keyed by setting id
    #[serde(default)]
    platform: HashMap<String, String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default)]
    demo_mode: bool,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceSettings {
    #[serde(default = "default_order_limit")]
    pub order_limit: usize,
}

impl Default for MarketplaceSettings {
    fn default() -> Self {
        Self {
            order_limit: DEFAULT_ORDER_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    #[serde(default = "default_notification_limit")]
    pub limit: usize,
    /// Mirror read/unread/delete to the store (best effort)
    #[serde(default)]
    pub sync_mutations: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            limit: DEFAULT_NOTIFICATION_LIMIT,
            sync_mutations: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycSettings {
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: u64,
}

impl Default for KycSettings {
    fn default() -> Self {
        Self {
            max_document_bytes: MAX_DOCUMENT_BYTES,
        }
    }
}

fn default_order_limit() -> usize {
    DEFAULT_ORDER_LIMIT
}

fn default_notification_limit() -> usize {
    DEFAULT_NOTIFICATION_LIMIT
}

fn default_max_document_bytes() -> u64 {
    MAX_DOCUMENT_BYTES
}

/// PeersFX configuration (simplified view of settings)
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub demo_mode: bool,
    pub marketplace: MarketplaceSettings,
    pub notifications: NotificationSettings,
    pub kyc: KycSettings,
    pub compliance: ComplianceThresholds,
    pub platform: HashMap<String, String>,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Config {
    /// Load config from the data directory
    ///
    /// Demo mode can be enabled via:
    /// 1. Settings file (pfx demo on)
    /// 2. Environment variable PEERSFX_DEMO_MODE (for CI/testing)
    pub fn load(data_dir: &Path) -> Result<Self> {
        let settings_path = data_dir.join(SETTINGS_FILE);

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        let demo_mode = match std::env::var("PEERSFX_DEMO_MODE").ok().as_deref() {
            Some("true" | "1" | "yes" | "TRUE" | "YES") => true,
            Some("false" | "0" | "no" | "FALSE" | "NO") => false,
            _ => raw.app.demo_mode,
        };

        Ok(Self {
            demo_mode,
            marketplace: raw.marketplace.clone(),
            notifications: raw.notifications.clone(),
            kyc: raw.kyc.clone(),
            compliance: raw.compliance.clone(),
            platform: raw.platform.clone(),
            _raw_settings: raw,
        })
    }

    /// Save config to the data directory
    /// Preserves other settings that the CLI doesn't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let settings_path = data_dir.join(SETTINGS_FILE);

        // Load existing settings to preserve fields we don't manage
        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            self._raw_settings.clone()
        };

        settings.app.demo_mode = self.demo_mode;
        settings.marketplace = self.marketplace.clone();
        settings.notifications = self.notifications.clone();
        settings.kyc = self.kyc.clone();
        settings.compliance = self.compliance.clone();
        settings.platform = self.platform.clone();

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    pub fn enable_demo_mode(&mut self) {
        self.demo_mode = true;
    }

    pub fn disable_demo_mode(&mut self) {
        self.demo_mode = false;
    }
}
