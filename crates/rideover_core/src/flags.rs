//! Feature flags resolved once at startup and handed down to the views.
//!
//! Each flag is looked up in the config file's `flags` section first, then in
//! a `RIDEOVER_PUBLIC_<KEY>` environment variable, and finally falls back to
//! its documented default.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

pub const FLAG_ENV_PREFIX: &str = "RIDEOVER_PUBLIC_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureFlag {
    Mapbox,
    RideTracking,
    LocationSelector,
    Payment,
    SafetyFeatures,
    DriverMode,
    LoyaltyProgram,
    Referrals,
}

impl FeatureFlag {
    pub const ALL: [FeatureFlag; 8] = [
        FeatureFlag::Mapbox,
        FeatureFlag::RideTracking,
        FeatureFlag::LocationSelector,
        FeatureFlag::Payment,
        FeatureFlag::SafetyFeatures,
        FeatureFlag::DriverMode,
        FeatureFlag::LoyaltyProgram,
        FeatureFlag::Referrals,
    ];

    /// Key used in config files and as the base of the env var name.
    pub fn key(self) -> &'static str {
        match self {
            FeatureFlag::Mapbox => "enableMapbox",
            FeatureFlag::RideTracking => "enableRideTracking",
            FeatureFlag::LocationSelector => "enableLocationSelector",
            FeatureFlag::Payment => "enablePayment",
            FeatureFlag::SafetyFeatures => "enableSafetyFeatures",
            FeatureFlag::DriverMode => "enableDriverMode",
            FeatureFlag::LoyaltyProgram => "enableLoyaltyProgram",
            FeatureFlag::Referrals => "enableReferrals",
        }
    }

    pub fn default_value(self) -> bool {
        matches!(
            self,
            FeatureFlag::RideTracking | FeatureFlag::LocationSelector | FeatureFlag::Payment
        )
    }

    pub fn env_var(self) -> String {
        format!("{FLAG_ENV_PREFIX}{}", self.key().to_uppercase())
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flag| flag.key() == key)
    }
}

/// Per-key overrides as written in the config file.
pub type FlagOverrides = BTreeMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    pub enable_mapbox: bool,
    pub enable_ride_tracking: bool,
    pub enable_location_selector: bool,
    pub enable_payment: bool,
    pub enable_safety_features: bool,
    pub enable_driver_mode: bool,
    pub enable_loyalty_program: bool,
    pub enable_referrals: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        let mut flags = Self {
            enable_mapbox: false,
            enable_ride_tracking: false,
            enable_location_selector: false,
            enable_payment: false,
            enable_safety_features: false,
            enable_driver_mode: false,
            enable_loyalty_program: false,
            enable_referrals: false,
        };
        for flag in FeatureFlag::ALL {
            flags.set(flag, flag.default_value());
        }
        flags
    }
}

impl FeatureFlags {
    pub fn resolve<F>(overrides: &FlagOverrides, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut flags = Self::default();
        for flag in FeatureFlag::ALL {
            let value = match overrides.get(flag.key()) {
                Some(value) if !value.is_null() => Some(value_enables(value)),
                _ => env(&flag.env_var()).map(|raw| raw == "true"),
            };
            if let Some(value) = value {
                flags.set(flag, value);
            }
        }
        flags
    }

    pub fn from_env(overrides: &FlagOverrides) -> Self {
        Self::resolve(overrides, |name| std::env::var(name).ok())
    }

    pub fn is_enabled(&self, flag: FeatureFlag) -> bool {
        match flag {
            FeatureFlag::Mapbox => self.enable_mapbox,
            FeatureFlag::RideTracking => self.enable_ride_tracking,
            FeatureFlag::LocationSelector => self.enable_location_selector,
            FeatureFlag::Payment => self.enable_payment,
            FeatureFlag::SafetyFeatures => self.enable_safety_features,
            FeatureFlag::DriverMode => self.enable_driver_mode,
            FeatureFlag::LoyaltyProgram => self.enable_loyalty_program,
            FeatureFlag::Referrals => self.enable_referrals,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureFlag, bool)> + '_ {
        FeatureFlag::ALL
            .into_iter()
            .map(move |flag| (flag, self.is_enabled(flag)))
    }

    fn set(&mut self, flag: FeatureFlag, value: bool) {
        let slot = match flag {
            FeatureFlag::Mapbox => &mut self.enable_mapbox,
            FeatureFlag::RideTracking => &mut self.enable_ride_tracking,
            FeatureFlag::LocationSelector => &mut self.enable_location_selector,
            FeatureFlag::Payment => &mut self.enable_payment,
            FeatureFlag::SafetyFeatures => &mut self.enable_safety_features,
            FeatureFlag::DriverMode => &mut self.enable_driver_mode,
            FeatureFlag::LoyaltyProgram => &mut self.enable_loyalty_program,
            FeatureFlag::Referrals => &mut self.enable_referrals,
        };
        *slot = value;
    }
}

fn value_enables(value: &Value) -> bool {
    match value {
        Value::Bool(enabled) => *enabled,
        Value::String(raw) => raw == "true",
        _ => false,
    }
}

/// There is no remote flag service; requested changes are only logged.
pub fn update_flag(flag: FeatureFlag, value: bool) {
    info!(flag = flag.key(), value, "feature flag update requested");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_match_documented_table() {
        let flags = FeatureFlags::default();
        assert!(!flags.enable_mapbox);
        assert!(flags.enable_ride_tracking);
        assert!(flags.enable_location_selector);
        assert!(flags.enable_payment);
        assert!(!flags.enable_safety_features);
        assert!(!flags.enable_driver_mode);
        assert!(!flags.enable_loyalty_program);
        assert!(!flags.enable_referrals);
        assert_eq!(FeatureFlags::resolve(&FlagOverrides::new(), no_env), flags);
    }

    #[test]
    fn env_var_names_uppercase_the_key() {
        assert_eq!(
            FeatureFlag::LocationSelector.env_var(),
            "RIDEOVER_PUBLIC_ENABLELOCATIONSELECTOR"
        );
    }

    #[test]
    fn config_value_wins_over_env() {
        let mut overrides = FlagOverrides::new();
        overrides.insert("enableMapbox".to_string(), json!(true));
        overrides.insert("enablePayment".to_string(), json!(false));
        let flags = FeatureFlags::resolve(&overrides, |name| match name {
            "RIDEOVER_PUBLIC_ENABLEMAPBOX" => Some("false".to_string()),
            "RIDEOVER_PUBLIC_ENABLEPAYMENT" => Some("true".to_string()),
            _ => None,
        });
        assert!(flags.is_enabled(FeatureFlag::Mapbox));
        assert!(!flags.is_enabled(FeatureFlag::Payment));
    }

    #[test]
    fn env_value_must_be_literal_true() {
        let flags = FeatureFlags::resolve(&FlagOverrides::new(), |name| match name {
            "RIDEOVER_PUBLIC_ENABLEREFERRALS" => Some("true".to_string()),
            "RIDEOVER_PUBLIC_ENABLERIDETRACKING" => Some("yes".to_string()),
            _ => None,
        });
        assert!(flags.is_enabled(FeatureFlag::Referrals));
        assert!(!flags.is_enabled(FeatureFlag::RideTracking));
    }

    #[test]
    fn string_and_odd_config_values() {
        let mut overrides = FlagOverrides::new();
        overrides.insert("enableDriverMode".to_string(), json!("true"));
        overrides.insert("enableLocationSelector".to_string(), json!(1));
        overrides.insert("enableSafetyFeatures".to_string(), Value::Null);
        let flags = FeatureFlags::resolve(&overrides, no_env);
        assert!(flags.enable_driver_mode);
        assert!(!flags.enable_location_selector);
        assert!(!flags.enable_safety_features);
    }

    #[test]
    fn keys_round_trip_through_lookup() {
        for flag in FeatureFlag::ALL {
            assert_eq!(FeatureFlag::from_key(flag.key()), Some(flag));
        }
        assert_eq!(FeatureFlag::from_key("enableTeleport"), None);
    }
}
