//! Engine settings with environment overrides.

use std::env;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{ConfigError, ConfigResult};

/// Sanity ceiling for any configured rate. A rate above it is almost always a
/// per-token price entered where a per-million price was expected.
pub const DEFAULT_MAX_RATE: Decimal = dec!(10_000);

/// Decimal places `total_cost` is rounded to.
pub const DEFAULT_DECIMAL_PLACES: u32 = 9;

/// Largest scale `Decimal` can represent.
pub const MAX_DECIMAL_PLACES: u32 = 28;

pub const ENV_MAX_RATE: &str = "PRICEBOOK_MAX_RATE";
pub const ENV_DECIMAL_PLACES: &str = "PRICEBOOK_DECIMAL_PLACES";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub max_rate: Decimal,
    pub decimal_places: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_rate: DEFAULT_MAX_RATE,
            decimal_places: DEFAULT_DECIMAL_PLACES,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_rate(mut self, max_rate: Decimal) -> Self {
        self.max_rate = max_rate;
        self
    }

    pub fn decimal_places(mut self, places: u32) -> Self {
        self.decimal_places = places.min(MAX_DECIMAL_PLACES);
        self
    }

    /// Defaults overridden by `PRICEBOOK_MAX_RATE` and `PRICEBOOK_DECIMAL_PLACES`.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_MAX_RATE) {
            let rate: Decimal = raw.trim().parse().map_err(|e| ConfigError::Env {
                key: ENV_MAX_RATE.to_string(),
                message: format!("'{}' is not a decimal: {}", raw, e),
            })?;
            if rate.is_sign_negative() {
                return Err(ConfigError::Env {
                    key: ENV_MAX_RATE.to_string(),
                    message: format!("'{}' must not be negative", raw),
                });
            }
            config.max_rate = rate;
        }

        if let Some(raw) = lookup(ENV_DECIMAL_PLACES) {
            let places: u32 = raw.trim().parse().map_err(|e| ConfigError::Env {
                key: ENV_DECIMAL_PLACES.to_string(),
                message: format!("'{}' is not an integer: {}", raw, e),
            })?;
            if places > MAX_DECIMAL_PLACES {
                return Err(ConfigError::Env {
                    key: ENV_DECIMAL_PLACES.to_string(),
                    message: format!("{} exceeds the maximum of {}", places, MAX_DECIMAL_PLACES),
                });
            }
            config.decimal_places = places;
        }

        Ok(config)
    }
}
