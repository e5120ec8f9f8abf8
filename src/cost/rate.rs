use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::ModelPricing;

/// Tier id reported when the flat model rates apply.
pub const DEFAULT_TIER: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedRate {
    pub input_rate: Decimal,
    pub output_rate: Decimal,
    pub tier_id: String,
}

/// Pick the tier with the greatest `min_units` not above `total_input_units`.
///
/// Tiers are ascending (enforced at load). Without tiers, or below the
/// lowest threshold, the flat rates apply.
pub fn select_rate(pricing: &ModelPricing, total_input_units: u64) -> SelectedRate {
    let idx = pricing
        .tiers
        .partition_point(|tier| tier.min_units <= total_input_units);

    match idx.checked_sub(1).and_then(|i| pricing.tiers.get(i)) {
        Some(tier) => SelectedRate {
            input_rate: tier.input_rate,
            output_rate: tier.output_rate,
            tier_id: tier.id(),
        },
        None => SelectedRate {
            input_rate: pricing.input_rate,
            output_rate: pricing.output_rate,
            tier_id: DEFAULT_TIER.to_string(),
        },
    }
}
