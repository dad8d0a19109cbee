//! # Engine Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CAFE_DB_PATH=./data/cafe.db                                        │
//! │     CAFE_LOYALTY_UNIT=10000                                            │
//! │     CAFE_MAX_RETRIES=3                                                 │
//! │     CAFE_CURRENCY_SYMBOL=₫                                             │
//! │                                                                         │
//! │  2. Default Values (lowest priority)                                   │
//! │     ./cafe.db, 10 per point, 3 retries, "$"                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An unset variable falls back to its default. A variable that is set but
//! cannot be parsed is a [`ConfigError`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use cafe_core::{Money, DEFAULT_LOYALTY_UNIT, MONEY_DECIMAL_PLACES};

pub const ENV_DB_PATH: &str = "CAFE_DB_PATH";
pub const ENV_LOYALTY_UNIT: &str = "CAFE_LOYALTY_UNIT";
pub const ENV_MAX_RETRIES: &str = "CAFE_MAX_RETRIES";
pub const ENV_CURRENCY_SYMBOL: &str = "CAFE_CURRENCY_SYMBOL";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}='{value}' is invalid: {reason}")]
    InvalidValue {
        var: String,
        value: String,
        reason: String,
    },
}

/// Engine configuration, read-only after startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// SQLite database file.
    /// Default: ./cafe.db
    pub database_path: PathBuf,

    /// Currency amount that earns one loyalty point.
    /// Default: 10
    pub loyalty_unit: Decimal,

    /// How many times a payment is re-run after a stale stock write or a
    /// busy database before giving up with `Conflict`.
    /// Default: 3
    pub max_retries: u32,

    /// Currency symbol (for display)
    pub currency_symbol: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            database_path: PathBuf::from("./cafe.db"),
            loyalty_unit: Decimal::from(DEFAULT_LOYALTY_UNIT),
            max_retries: 3,
            currency_symbol: "$".to_string(),
        }
    }
}

impl EngineConfig {
    /// Builds the configuration from `CAFE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = EngineConfig::default();

        if let Some(path) = lookup(ENV_DB_PATH) {
            debug!(path = %path, "Overriding database path from environment");
            config.database_path = PathBuf::from(path);
        }

        if let Some(raw) = lookup(ENV_LOYALTY_UNIT) {
            let unit = Decimal::from_str(raw.trim()).map_err(|e| invalid(ENV_LOYALTY_UNIT, &raw, e))?;
            if unit <= Decimal::ZERO {
                return Err(invalid(ENV_LOYALTY_UNIT, &raw, "must be positive"));
            }
            config.loyalty_unit = unit;
        }

        if let Some(raw) = lookup(ENV_MAX_RETRIES) {
            config.max_retries = raw
                .trim()
                .parse()
                .map_err(|e| invalid(ENV_MAX_RETRIES, &raw, e))?;
        }

        if let Some(symbol) = lookup(ENV_CURRENCY_SYMBOL) {
            config.currency_symbol = symbol;
        }

        Ok(config)
    }

    /// Formats an amount for logs and receipts, e.g. `$12.50`.
    pub fn format_money(&self, amount: Money) -> String {
        let rounded = amount.amount().round_dp(MONEY_DECIMAL_PLACES);
        format!("{}{:.2}", self.currency_symbol, rounded)
    }
}

fn invalid(var: &str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        var: var.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.loyalty_unit, dec!(10));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.database_path, PathBuf::from("./cafe.db"));
    }

    #[test]
    fn overrides_from_variables() {
        let config = EngineConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, "/tmp/shop.db"),
            (ENV_LOYALTY_UNIT, "10000"),
            (ENV_MAX_RETRIES, "5"),
            (ENV_CURRENCY_SYMBOL, "₫"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.loyalty_unit, dec!(10000));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.currency_symbol, "₫");
    }

    #[test]
    fn rejects_unparseable_values() {
        assert!(EngineConfig::from_lookup(lookup(&[(ENV_MAX_RETRIES, "many")])).is_err());
        assert!(EngineConfig::from_lookup(lookup(&[(ENV_LOYALTY_UNIT, "0")])).is_err());
    }

    #[test]
    fn formats_money_with_symbol() {
        let config = EngineConfig::default();
        assert_eq!(config.format_money(Money::new(dec!(12.5))), "$12.50");
        assert_eq!(config.format_money(Money::from_major(40_000)), "$40000.00");
    }
}
