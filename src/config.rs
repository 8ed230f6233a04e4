//! Process-wide calculator configuration
//!
//! The default rounding mode is held as an immutable `Configuration`
//! snapshot behind a lock. Setters swap the snapshot; readers get a copy,
//! so mutating a returned value never touches shared state. Per-call
//! overrides go through `PremiumOptions` and never reach this module.

use std::fmt;
use std::str::FromStr;
use std::sync::{OnceLock, RwLock};

use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::schedule::texas_2019;

/// Final rounding applied to a computed premium
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Exact to cents
    #[default]
    None,
    /// Whole dollars, half away from zero
    NearestDollar,
}

impl RoundingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundingMode::None => "none",
            RoundingMode::NearestDollar => "nearest_dollar",
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a rounding mode name outside the enumerated set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown rounding mode '{0}' (expected 'none' or 'nearest_dollar')")]
pub struct UnknownRoundingMode(pub String);

impl FromStr for RoundingMode {
    type Err = UnknownRoundingMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(RoundingMode::None),
            "nearest_dollar" => Ok(RoundingMode::NearestDollar),
            other => Err(UnknownRoundingMode(other.to_string())),
        }
    }
}

/// Snapshot of the calculator defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Rounding used when a call supplies no override
    pub rounding_mode: RoundingMode,

    /// Effective date of the schedule calculations are priced from
    pub effective_date: NaiveDate,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            rounding_mode: RoundingMode::default(),
            effective_date: texas_2019::effective_date(),
        }
    }
}

impl Configuration {
    /// Merge a partial update. Invalid values are ignored and the current
    /// value kept. Returns true if anything changed.
    pub fn apply(&mut self, update: &ConfigurationUpdate) -> bool {
        let Some(requested) = update.rounding_mode.as_deref() else {
            return false;
        };
        match requested.parse::<RoundingMode>() {
            Ok(mode) => {
                let changed = mode != self.rounding_mode;
                self.rounding_mode = mode;
                changed
            }
            Err(e) => {
                warn!("ignoring configuration update: {}", e);
                false
            }
        }
    }
}

/// Partial configuration as supplied by a host; unknown or missing fields
/// leave the current value in place
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationUpdate {
    #[serde(default, alias = "roundingMode")]
    pub rounding_mode: Option<String>,
}

impl ConfigurationUpdate {
    pub fn rounding_mode(mode: RoundingMode) -> Self {
        Self {
            rounding_mode: Some(mode.as_str().to_string()),
        }
    }
}

fn shared() -> &'static RwLock<Configuration> {
    static SHARED: OnceLock<RwLock<Configuration>> = OnceLock::new();
    SHARED.get_or_init(|| RwLock::new(Configuration::default()))
}

/// Copy of the current process-wide configuration
pub fn get_configuration() -> Configuration {
    // A poisoned lock still holds a complete snapshot
    shared()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Merge `update` into the process-wide configuration
pub fn set_configuration(update: ConfigurationUpdate) {
    let mut current = shared()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let mut next = current.clone();
    if next.apply(&update) {
        debug!("default rounding mode set to {}", next.rounding_mode);
        *current = next;
    }
}

/// Restore the process-wide defaults
pub fn reset_configuration() {
    let mut current = shared()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *current = Configuration::default();
}

/// Serializes tests that touch the process-wide configuration
#[cfg(test)]
pub(crate) fn test_guard() -> std::sync::MutexGuard<'static, ()> {
    static GUARD: std::sync::Mutex<()> = std::sync::Mutex::new(());
    GUARD.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_mode_names() {
        assert_eq!("none".parse::<RoundingMode>(), Ok(RoundingMode::None));
        assert_eq!("nearest_dollar".parse::<RoundingMode>(), Ok(RoundingMode::NearestDollar));
        assert!("NEAREST_DOLLAR".parse::<RoundingMode>().is_err());
        assert!("cents".parse::<RoundingMode>().is_err());

        let json = serde_json::to_string(&RoundingMode::NearestDollar).unwrap();
        assert_eq!(json, "\"nearest_dollar\"");
    }

    #[test]
    fn test_defaults() {
        let config = Configuration::default();
        assert_eq!(config.rounding_mode, RoundingMode::None);
        assert_eq!(config.effective_date.to_string(), "2019-09-01");
    }

    #[test]
    fn test_apply_ignores_invalid_values() {
        let mut config = Configuration::default();

        assert!(config.apply(&ConfigurationUpdate::rounding_mode(RoundingMode::NearestDollar)));
        assert_eq!(config.rounding_mode, RoundingMode::NearestDollar);

        let bogus = ConfigurationUpdate { rounding_mode: Some("banker".into()) };
        assert!(!config.apply(&bogus));
        assert_eq!(config.rounding_mode, RoundingMode::NearestDollar);

        assert!(!config.apply(&ConfigurationUpdate::default()));
        assert_eq!(config.rounding_mode, RoundingMode::NearestDollar);
    }

    #[test]
    fn test_update_from_partial_json() {
        let update: ConfigurationUpdate = serde_json::from_str("{}").unwrap();
        assert_eq!(update.rounding_mode, None);

        let update: ConfigurationUpdate =
            serde_json::from_str(r#"{"rounding_mode":"nearest_dollar"}"#).unwrap();
        assert_eq!(update.rounding_mode.as_deref(), Some("nearest_dollar"));

        // Browser hosts send camelCase keys
        let update: ConfigurationUpdate =
            serde_json::from_str(r#"{"roundingMode":"nearest_dollar"}"#).unwrap();
        assert_eq!(update.rounding_mode.as_deref(), Some("nearest_dollar"));

        let mut config = Configuration::default();
        assert!(config.apply(&update));
        assert_eq!(config.rounding_mode, RoundingMode::NearestDollar);
    }

    #[test]
    fn test_global_get_returns_copy() {
        let _guard = test_guard();
        reset_configuration();

        let mut copy = get_configuration();
        copy.rounding_mode = RoundingMode::NearestDollar;
        assert_eq!(get_configuration().rounding_mode, RoundingMode::None);

        set_configuration(ConfigurationUpdate::rounding_mode(RoundingMode::NearestDollar));
        assert_eq!(get_configuration().rounding_mode, RoundingMode::NearestDollar);

        set_configuration(ConfigurationUpdate { rounding_mode: Some("half_even".into()) });
        assert_eq!(get_configuration().rounding_mode, RoundingMode::NearestDollar);

        reset_configuration();
        assert_eq!(get_configuration(), Configuration::default());
    }
}
