use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const FEATURE_FLAGS_KEY: &str = "feature_flags";

const DEFAULT_FLAGS: &[&str] = &["advanced_trading", "portfolio_analysis", "ai_suggestions"];

/// Database row for admin_settings table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AdminSetting {
    pub id: Uuid,
    pub setting_key: String,
    pub setting_value: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Boolean feature switches stored under the `feature_flags` setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FeatureFlags(BTreeMap<String, bool>);

impl Default for FeatureFlags {
    fn default() -> Self {
        Self(DEFAULT_FLAGS.iter().map(|k| (k.to_string(), false)).collect())
    }
}

impl FeatureFlags {
    /// Build flags from a stored setting value. The value may be a JSON
    /// object or a string holding one; non-boolean entries are dropped.
    pub fn from_setting_value(value: &serde_json::Value) -> Self {
        let parsed;
        let object = match value {
            serde_json::Value::String(raw) => {
                parsed = serde_json::from_str::<serde_json::Value>(raw).unwrap_or_default();
                parsed.as_object()
            }
            other => other.as_object(),
        };

        let mut flags = Self::default();
        if let Some(object) = object {
            for (name, enabled) in object {
                if let Some(enabled) = enabled.as_bool() {
                    flags.0.insert(name.clone(), enabled);
                }
            }
        }
        flags
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flags_from_object() {
        let flags = FeatureFlags::from_setting_value(&json!({
            "advanced_trading": true,
            "beta_charts": true,
            "broken": "yes",
        }));
        assert!(flags.is_enabled("advanced_trading"));
        assert!(flags.is_enabled("beta_charts"));
        assert!(!flags.is_enabled("portfolio_analysis"));
        assert!(!flags.is_enabled("broken"));
    }

    #[test]
    fn test_flags_from_string_value() {
        let flags = FeatureFlags::from_setting_value(&json!("{\"ai_suggestions\": true}"));
        assert!(flags.is_enabled("ai_suggestions"));
    }

    #[test]
    fn test_flags_garbage_falls_back_to_defaults() {
        let flags = FeatureFlags::from_setting_value(&json!("not json"));
        assert_eq!(flags, FeatureFlags::default());
    }
}
