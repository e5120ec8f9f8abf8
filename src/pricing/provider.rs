use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::credit::{CreditPricing, SubscriptionTier};
use super::grounding::GroundingPricing;
use super::image::ImagePricing;
use super::model::ModelPricing;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    #[serde(default)]
    pub source_urls: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
}

/// Validated pricing for one provider.
///
/// Every map is ordered so iteration (and therefore catalog construction) is
/// deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderEntry {
    pub provider_id: String,
    #[serde(default)]
    pub models: BTreeMap<String, ModelPricing>,
    #[serde(default)]
    pub image_models: BTreeMap<String, ImagePricing>,
    /// Keyed by model-name prefix.
    #[serde(default)]
    pub grounding: BTreeMap<String, GroundingPricing>,
    #[serde(default)]
    pub credit_pricing: Option<CreditPricing>,
    #[serde(default)]
    pub subscription_tiers: BTreeMap<String, SubscriptionTier>,
    #[serde(default)]
    pub metadata: ProviderMetadata,
}

impl ProviderEntry {
    pub fn new(provider_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            models: BTreeMap::new(),
            image_models: BTreeMap::new(),
            grounding: BTreeMap::new(),
            credit_pricing: None,
            subscription_tiers: BTreeMap::new(),
            metadata: ProviderMetadata::default(),
        }
    }

    pub fn qualified(&self, name: &str) -> String {
        qualified_key(&self.provider_id, name)
    }
}

pub fn qualified_key(provider_id: &str, name: &str) -> String {
    format!("{}/{}", provider_id, name)
}
