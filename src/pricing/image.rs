use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-image rate that applies from `min_count` images upward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageTier {
    pub min_count: u64,
    pub per_image_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePricing {
    pub per_image_rate: Decimal,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub count_tiers: Vec<ImageTier>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub resolutions: BTreeMap<String, Decimal>,
}

/// Rate picked for an image request, with the label that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRate {
    pub rate: Decimal,
    pub tier: String,
}

impl ImagePricing {
    pub fn new(per_image_rate: Decimal) -> Self {
        Self {
            per_image_rate,
            count_tiers: Vec::new(),
            resolutions: BTreeMap::new(),
        }
    }

    pub fn with_count_tier(mut self, min_count: u64, per_image_rate: Decimal) -> Self {
        self.count_tiers.push(ImageTier {
            min_count,
            per_image_rate,
        });
        self
    }

    pub fn with_resolution(mut self, resolution: impl Into<String>, rate: Decimal) -> Self {
        self.resolutions.insert(resolution.into(), rate);
        self
    }

    /// Resolution rates win over count tiers; `None` resolution or an
    /// unconfigured one falls through to count tiers, then the base rate.
    pub fn rate_for(&self, count: u64, resolution: Option<&str>) -> ImageRate {
        if let Some(res) = resolution
            && let Some(rate) = self.resolutions.get(res)
        {
            return ImageRate {
                rate: *rate,
                tier: res.to_string(),
            };
        }

        let idx = self.count_tiers.partition_point(|t| t.min_count <= count);
        match idx.checked_sub(1).and_then(|i| self.count_tiers.get(i)) {
            Some(tier) => ImageRate {
                rate: tier.per_image_rate,
                tier: format!("count-{}", tier.min_count),
            },
            None => ImageRate {
                rate: self.per_image_rate,
                tier: "default".to_string(),
            },
        }
    }
}
