//! Platform settings editable from the admin console
//!
//! Values are kept as strings (as the settings form edits them) and
//! checked against the setting's kind on every update.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::domain::result::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "options")]
pub enum SettingKind {
    Number,
    Boolean,
    Text,
    Select(Vec<String>),
    Textarea,
}

impl SettingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKind::Number => "number",
            SettingKind::Boolean => "boolean",
            SettingKind::Text => "text",
            SettingKind::Select(_) => "select",
            SettingKind::Textarea => "textarea",
        }
    }

    fn check(&self, value: &str) -> std::result::Result<(), String> {
        match self {
            SettingKind::Number => match Decimal::from_str(value.trim()) {
                Ok(n) if n >= Decimal::ZERO => Ok(()),
                Ok(_) => Err("must not be negative".to_string()),
                Err(_) => Err(format!("{:?} is not a number", value)),
            },
            SettingKind::Boolean => match value {
                "true" | "false" => Ok(()),
                _ => Err("must be true or false".to_string()),
            },
            SettingKind::Select(options) => {
                if options.iter().any(|o| o == value) {
                    Ok(())
                } else {
                    Err(format!("must be one of {}", options.join(", ")))
                }
            }
            SettingKind::Text | SettingKind::Textarea => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemSetting {
    pub key: String,
    pub value: String,
    pub description: String,
    pub kind: SettingKind,
}

fn setting(key: &str, value: &str, description: &str, kind: SettingKind) -> SystemSetting {
    SystemSetting {
        key: key.to_string(),
        value: value.to_string(),
        description: description.to_string(),
        kind,
    }
}

/// Built-in settings with their default values
pub fn default_settings() -> Vec<SystemSetting> {
    use SettingKind::*;
    vec![
        setting("platform_fee_percentage", "2.5", "Platform fee percentage for transactions", Number),
        setting("min_order_amount", "10", "Minimum order amount in USD", Number),
        setting("max_order_amount", "10000", "Maximum order amount in USD", Number),
        setting("kyc_required", "true", "Whether KYC verification is required for trading", Boolean),
        setting("maintenance_mode", "false", "Enable maintenance mode to restrict platform access", Boolean),
        setting("auto_match_orders", "true", "Automatically match compatible buy/sell orders", Boolean),
        setting("max_daily_volume", "50000", "Maximum daily trading volume per user in USD", Number),
        setting(
            "supported_currencies",
            "USD,EUR,GBP,CAD,AUD,JPY,CNY,INR",
            "Comma-separated list of supported currencies",
            Textarea,
        ),
        setting("email_notifications", "true", "Enable email notifications for users", Boolean),
        setting("dispute_timeout_hours", "72", "Hours before a transaction can be disputed", Number),
    ]
}

pub struct SettingsRegistry {
    settings: Vec<SystemSetting>,
    dirty: bool,
}

impl Default for SettingsRegistry {
    fn default() -> Self {
        Self::new(default_settings())
    }
}

impl SettingsRegistry {
    pub fn new(settings: Vec<SystemSetting>) -> Self {
        Self {
            settings,
            dirty: false,
        }
    }

    /// Defaults overlaid with saved values; invalid saved values are
    /// skipped with a warning
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        let mut registry = Self::default();
        for (key, value) in overrides {
            if let Err(e) = registry.update(key, value) {
                warn!(key = %key, error = %e, "ignoring saved platform setting");
            }
        }
        registry.dirty = false;
        registry
    }

    pub fn settings(&self) -> &[SystemSetting] {
        &self.settings
    }

    pub fn get(&self, key: &str) -> Option<&SystemSetting> {
        self.settings.iter().find(|s| s.key == key)
    }

    pub fn number(&self, key: &str) -> Option<Decimal> {
        self.get(key).and_then(|s| Decimal::from_str(s.value.trim()).ok())
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).map(|s| s.value == "true")
    }

    /// Validate and set one value; marks the registry dirty on change
    pub fn update(&mut self, key: &str, value: &str) -> Result<()> {
        let setting = self
            .settings
            .iter_mut()
            .find(|s| s.key == key)
            .ok_or_else(|| Error::not_found(format!("setting {}", key)))?;
        setting
            .kind
            .check(value)
            .map_err(|e| Error::validation(format!("{}: {}", key, e)))?;

        if setting.value != value {
            setting.value = value.to_string();
            self.dirty = true;
        }
        Ok(())
    }

    pub fn has_changes(&self) -> bool {
        self.dirty
    }

    /// Values that differ from the defaults, for persisting; clears the
    /// dirty flag
    pub fn save(&mut self) -> HashMap<String, String> {
        let defaults = default_settings();
        self.dirty = false;
        self.settings
            .iter()
            .filter(|s| {
                defaults
                    .iter()
                    .find(|d| d.key == s.key)
                    .map_or(true, |d| d.value != s.value)
            })
            .map(|s| (s.key.clone(), s.value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let registry = SettingsRegistry::default();
        assert_eq!(registry.settings().len(), 10);
        assert_eq!(registry.number("platform_fee_percentage"), Some(Decimal::new(25, 1)));
        assert_eq!(registry.flag("maintenance_mode"), Some(false));
        assert!(!registry.has_changes());
    }

    #[test]
    fn test_update_validates_by_kind() {
        let mut registry = SettingsRegistry::default();
        assert!(registry.update("min_order_amount", "abc").is_err());
        assert!(registry.update("min_order_amount", "-1").is_err());
        assert!(registry.update("kyc_required", "yes").is_err());
        assert!(registry.update("nope", "1").is_err());
        assert!(!registry.has_changes());

        registry.update("maintenance_mode", "true").unwrap();
        registry.update("supported_currencies", "USD,EUR").unwrap();
        assert!(registry.has_changes());

        let saved = registry.save();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved["maintenance_mode"], "true");
        assert!(!registry.has_changes());
    }

    #[test]
    fn test_select_options() {
        let mut registry = SettingsRegistry::new(vec![setting(
            "region",
            "eu",
            "Hosting region",
            SettingKind::Select(vec!["eu".into(), "us".into()]),
        )]);
        assert!(registry.update("region", "apac").is_err());
        registry.update("region", "us").unwrap();
        assert_eq!(registry.get("region").unwrap().value, "us");
    }

    #[test]
    fn test_overrides_skip_invalid_values() {
        let overrides = HashMap::from([
            ("max_order_amount".to_string(), "20000".to_string()),
            ("kyc_required".to_string(), "maybe".to_string()),
        ]);
        let registry = SettingsRegistry::with_overrides(&overrides);
        assert_eq!(registry.number("max_order_amount"), Some(Decimal::new(20_000, 0)));
        assert_eq!(registry.flag("kyc_required"), Some(true));
        assert!(!registry.has_changes());
    }
}
