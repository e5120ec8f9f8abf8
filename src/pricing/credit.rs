use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Multiplier names that select the unmultiplied base cost.
pub const BASE_MULTIPLIER_NAMES: [&str; 2] = ["", "base"];

/// Flat fee per request, scaled by named multipliers such as premium rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditPricing {
    pub base_cost_per_request: Decimal,
    #[serde(default)]
    pub multipliers: BTreeMap<String, Decimal>,
}

impl CreditPricing {
    pub fn new(base_cost_per_request: Decimal) -> Self {
        Self {
            base_cost_per_request,
            multipliers: BTreeMap::new(),
        }
    }

    pub fn with_multiplier(mut self, name: impl Into<String>, factor: Decimal) -> Self {
        self.multipliers.insert(name.into(), factor);
        self
    }

    pub fn multiplier(&self, name: &str) -> Option<Decimal> {
        if BASE_MULTIPLIER_NAMES.contains(&name) {
            return Some(Decimal::ONE);
        }
        self.multipliers.get(name).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionTier {
    pub monthly_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub included_credits: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
