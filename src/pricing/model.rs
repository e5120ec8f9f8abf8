//! Token pricing for text models.
//!
//! Rates are expressed in currency per million units. A model may carry a
//! flat input/output rate, an optional cache discount, volume tiers and a
//! batch multiplier whose interaction with caching is set by
//! [`BatchCacheRule`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How the batch multiplier composes with the cache discount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BatchCacheRule {
    /// Every token item is multiplied by the batch multiplier on its own.
    #[default]
    #[serde(alias = "independent")]
    Independent,
    /// The batch discount is taken once over the whole token subtotal.
    #[serde(alias = "batch_precedence")]
    BatchPrecedence,
    /// Cached input keeps its cache-discounted cost; batch applies to the rest.
    #[serde(alias = "cache_precedence")]
    CachePrecedence,
}

/// One usage-volume bracket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingTier {
    pub min_units: u64,
    pub input_rate: Decimal,
    pub output_rate: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl PricingTier {
    pub fn new(min_units: u64, input_rate: Decimal, output_rate: Decimal) -> Self {
        Self {
            min_units,
            input_rate,
            output_rate,
            name: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn id(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("tier-{}", self.min_units))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    pub input_rate: Decimal,
    pub output_rate: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_input_rate: Option<Decimal>,
    #[serde(
        default,
        alias = "cache_discount_multiplier",
        skip_serializing_if = "Option::is_none"
    )]
    pub cache_multiplier: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tiers: Vec<PricingTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_multiplier: Option<Decimal>,
    #[serde(default)]
    pub batch_cache_rule: BatchCacheRule,
}

impl ModelPricing {
    pub fn new(input_rate: Decimal, output_rate: Decimal) -> Self {
        Self {
            input_rate,
            output_rate,
            cached_input_rate: None,
            cache_multiplier: None,
            tiers: Vec::new(),
            batch_multiplier: None,
            batch_cache_rule: BatchCacheRule::default(),
        }
    }

    pub fn with_cache_multiplier(mut self, multiplier: Decimal) -> Self {
        self.cache_multiplier = Some(multiplier);
        self
    }

    pub fn with_cached_input_rate(mut self, rate: Decimal) -> Self {
        self.cached_input_rate = Some(rate);
        self
    }

    pub fn with_tier(mut self, tier: PricingTier) -> Self {
        self.tiers.push(tier);
        self
    }

    pub fn with_batch(mut self, multiplier: Decimal, rule: BatchCacheRule) -> Self {
        self.batch_multiplier = Some(multiplier);
        self.batch_cache_rule = rule;
        self
    }

    /// Batch multiplier, `1` when none is configured.
    pub fn batch_multiplier(&self) -> Decimal {
        self.batch_multiplier.unwrap_or(Decimal::ONE)
    }

    /// Per-million rate billed for cached input given the selected input rate.
    ///
    /// A multiplier scales the (possibly tiered) input rate and wins over an
    /// absolute cached rate. Without either, cached input is billed in full.
    pub fn cached_rate(&self, input_rate: Decimal) -> Decimal {
        match (self.cache_multiplier, self.cached_input_rate) {
            (Some(multiplier), _) => input_rate.saturating_mul(multiplier),
            (None, Some(rate)) => rate,
            (None, None) => input_rate,
        }
    }
}
