//! Itemized calculation results.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::MatchKind;

/// Rates that produced a token breakdown, per million units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedRates {
    pub input_rate: Decimal,
    pub cached_input_rate: Decimal,
    pub output_rate: Decimal,
    pub batch_multiplier: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding_rate: Option<Decimal>,
}

/// Cost of one token-billed call.
///
/// When `unknown` is set every cost field is zero and `provider`/`model` are
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_kind: Option<MatchKind>,
    pub standard_input_cost: Decimal,
    pub cached_input_cost: Decimal,
    pub output_cost: Decimal,
    pub thinking_cost: Decimal,
    pub grounding_cost: Decimal,
    pub tier_applied: String,
    /// Token subtotal before batch minus after; zero outside batch mode.
    pub batch_discount_amount: Decimal,
    pub batch_mode: bool,
    pub total_cost: Decimal,
    #[serde(default)]
    pub warnings: Vec<String>,
    pub unknown: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rates: Option<AppliedRates>,
}

impl CostBreakdown {
    pub fn unknown(batch_mode: bool) -> Self {
        Self {
            batch_mode,
            unknown: true,
            ..Default::default()
        }
    }

    /// Sum of the four token items as stored.
    pub fn token_subtotal(&self) -> Decimal {
        self.standard_input_cost
            .saturating_add(self.cached_input_cost)
            .saturating_add(self.output_cost)
            .saturating_add(self.thinking_cost)
    }

    pub fn has_warning(&self, warning: &str) -> bool {
        self.warnings.iter().any(|w| w == warning)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageCostBreakdown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_kind: Option<MatchKind>,
    pub image_count: u64,
    pub per_image_rate: Decimal,
    pub tier_applied: String,
    pub total_cost: Decimal,
    #[serde(default)]
    pub warnings: Vec<String>,
    pub unknown: bool,
}

impl ImageCostBreakdown {
    pub fn unknown() -> Self {
        Self {
            unknown: true,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCostBreakdown {
    pub provider: String,
    pub multiplier_name: String,
    pub base_cost: Decimal,
    /// `None` when the name was not recognized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<Decimal>,
    pub total_cost: Decimal,
    #[serde(default)]
    pub warnings: Vec<String>,
    pub unknown: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_unknown_is_all_zero() {
        let breakdown = CostBreakdown::unknown(true);
        assert!(breakdown.unknown);
        assert!(breakdown.batch_mode);
        assert_eq!(breakdown.total_cost, Decimal::ZERO);
        assert_eq!(breakdown.token_subtotal(), Decimal::ZERO);
        assert!(breakdown.provider.is_none());
    }

    #[test]
    fn test_serializes_for_json_consumers() {
        let breakdown = CostBreakdown {
            provider: Some("openai".into()),
            model: Some("gpt-4o".into()),
            match_kind: Some(MatchKind::Prefix),
            output_cost: dec!(0.01),
            total_cost: dec!(0.01),
            tier_applied: "default".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&breakdown).unwrap();
        assert_eq!(json["provider"], "openai");
        assert_eq!(json["match_kind"], "prefix");
        assert_eq!(json["total_cost"], "0.01");
        assert!(json.get("rates").is_none());

        let back: CostBreakdown = serde_json::from_value(json).unwrap();
        assert_eq!(back, breakdown);
    }
}
