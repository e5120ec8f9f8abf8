//! On-disk provider record schema.

use std::collections::BTreeMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ConfigError, ConfigResult};
use crate::pricing::{
    CreditPricing, ImagePricing, ModelPricing, ProviderMetadata, SubscriptionTier,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// `.yaml` / `.yml` documents are YAML, everything else JSON.
    pub fn from_name(name: &str) -> Self {
        match Path::new(name).extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

/// Grounding entry as written; the billing model is checked by the validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundingRecord {
    pub per_thousand_queries: Decimal,
    pub billing_model: String,
    #[serde(default)]
    pub batch_grounding_ok: bool,
}

/// One provider's raw pricing document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRecord {
    pub provider_id: String,
    #[serde(default)]
    pub models: BTreeMap<String, ModelPricing>,
    #[serde(default)]
    pub image_models: BTreeMap<String, ImagePricing>,
    #[serde(default)]
    pub grounding: BTreeMap<String, GroundingRecord>,
    #[serde(default)]
    pub credit_pricing: Option<CreditPricing>,
    #[serde(default)]
    pub subscription_tiers: Option<BTreeMap<String, SubscriptionTier>>,
    #[serde(default)]
    pub metadata: ProviderMetadata,
}

impl ProviderRecord {
    pub fn new(provider_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            models: BTreeMap::new(),
            image_models: BTreeMap::new(),
            grounding: BTreeMap::new(),
            credit_pricing: None,
            subscription_tiers: None,
            metadata: ProviderMetadata::default(),
        }
    }

    pub fn model(mut self, name: impl Into<String>, pricing: ModelPricing) -> Self {
        self.models.insert(name.into(), pricing);
        self
    }

    pub fn image_model(mut self, name: impl Into<String>, pricing: ImagePricing) -> Self {
        self.image_models.insert(name.into(), pricing);
        self
    }

    pub fn grounding(mut self, prefix: impl Into<String>, record: GroundingRecord) -> Self {
        self.grounding.insert(prefix.into(), record);
        self
    }

    pub fn credit_pricing(mut self, pricing: CreditPricing) -> Self {
        self.credit_pricing = Some(pricing);
        self
    }

    /// Decode a document, choosing the format from its name.
    pub fn parse(document: &str, bytes: &[u8]) -> ConfigResult<Self> {
        let parse_err = |message: String| ConfigError::Parse {
            document: document.to_string(),
            message,
        };

        let text = std::str::from_utf8(bytes).map_err(|e| parse_err(e.to_string()))?;
        match DocumentFormat::from_name(document) {
            DocumentFormat::Json => {
                serde_json::from_str(text).map_err(|e| parse_err(e.to_string()))
            }
            DocumentFormat::Yaml => {
                serde_yaml_bw::from_str(text).map_err(|e| parse_err(e.to_string()))
            }
        }
    }
}
