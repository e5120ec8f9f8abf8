//! Per-field checks applied to raw provider records before catalog insertion.
//!
//! Validation stops at the first violation and reports the document, the
//! dotted field path and the offending value.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use super::schema::{GroundingRecord, ProviderRecord};
use super::settings::{DEFAULT_MAX_RATE, EngineConfig};
use super::{ConfigError, ConfigResult};
use crate::pricing::{
    BillingModel, CreditPricing, GroundingPricing, ImagePricing, ModelPricing, ProviderEntry,
    SubscriptionTier,
};

static PROVIDER_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("provider id pattern is valid")
});

#[derive(Debug, Clone)]
pub struct PricingValidator {
    max_rate: Decimal,
}

impl Default for PricingValidator {
    fn default() -> Self {
        Self {
            max_rate: DEFAULT_MAX_RATE,
        }
    }
}

impl PricingValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            max_rate: config.max_rate,
        }
    }

    pub fn max_rate(mut self, max_rate: Decimal) -> Self {
        self.max_rate = max_rate;
        self
    }

    /// Approve a record, turning it into a catalog-ready entry.
    pub fn validate(&self, document: &str, record: ProviderRecord) -> ConfigResult<ProviderEntry> {
        let check = Check {
            document,
            max_rate: self.max_rate,
        };

        if !PROVIDER_ID.is_match(&record.provider_id) {
            return Err(check.fail(
                "provider_id",
                &record.provider_id,
                "must start with an alphanumeric and contain only [A-Za-z0-9._-]",
            ));
        }

        for (name, pricing) in &record.models {
            check.key("models", name)?;
            check.model(&format!("models.{}", name), pricing)?;
        }

        for (name, pricing) in &record.image_models {
            check.key("image_models", name)?;
            check.image(&format!("image_models.{}", name), pricing)?;
        }

        let mut grounding = BTreeMap::new();
        for (prefix, raw) in record.grounding {
            check.key("grounding", &prefix)?;
            let pricing = check.grounding(&format!("grounding.{}", prefix), raw)?;
            grounding.insert(prefix, pricing);
        }

        if let Some(credit) = &record.credit_pricing {
            check.credit(credit)?;
        }

        let subscription_tiers = record.subscription_tiers.unwrap_or_default();
        for (name, tier) in &subscription_tiers {
            check.subscription(&format!("subscription_tiers.{}", name), tier)?;
        }

        for (i, source) in record.metadata.source_urls.iter().enumerate() {
            if let Err(e) = url::Url::parse(source) {
                return Err(check.fail(
                    format!("metadata.source_urls[{}]", i),
                    source,
                    format!("not an absolute URL: {}", e),
                ));
            }
        }

        Ok(ProviderEntry {
            provider_id: record.provider_id,
            models: record.models,
            image_models: record.image_models,
            grounding,
            credit_pricing: record.credit_pricing,
            subscription_tiers,
            metadata: record.metadata,
        })
    }
}

struct Check<'a> {
    document: &'a str,
    max_rate: Decimal,
}

impl Check<'_> {
    fn fail(
        &self,
        field: impl Into<String>,
        value: impl ToString,
        message: impl Into<String>,
    ) -> ConfigError {
        ConfigError::invalid(self.document, field, value, message)
    }

    fn key(&self, namespace: &str, key: &str) -> ConfigResult<()> {
        if key.trim().is_empty() {
            return Err(self.fail(namespace, format!("{:?}", key), "keys must not be empty"));
        }
        Ok(())
    }

    fn non_negative(&self, field: &str, value: Decimal) -> ConfigResult<()> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(self.fail(field, value, "must not be negative"));
        }
        Ok(())
    }

    fn rate(&self, field: &str, value: Decimal) -> ConfigResult<()> {
        self.non_negative(field, value)?;
        if value > self.max_rate {
            return Err(self.fail(
                field,
                value,
                format!(
                    "exceeds the sanity ceiling of {} (is the rate per unit instead of per million?)",
                    self.max_rate
                ),
            ));
        }
        Ok(())
    }

    fn model(&self, path: &str, pricing: &ModelPricing) -> ConfigResult<()> {
        self.rate(&format!("{}.input_rate", path), pricing.input_rate)?;
        self.rate(&format!("{}.output_rate", path), pricing.output_rate)?;

        if let Some(rate) = pricing.cached_input_rate {
            self.rate(&format!("{}.cached_input_rate", path), rate)?;
        }

        if let Some(multiplier) = pricing.cache_multiplier {
            let field = format!("{}.cache_multiplier", path);
            if multiplier < Decimal::ZERO || multiplier > Decimal::ONE {
                return Err(self.fail(field, multiplier, "must be within [0, 1]"));
            }
        }

        let mut previous: Option<u64> = None;
        for (i, tier) in pricing.tiers.iter().enumerate() {
            let tier_path = format!("{}.tiers[{}]", path, i);
            if let Some(prev) = previous
                && tier.min_units <= prev
            {
                return Err(self.fail(
                    format!("{}.min_units", tier_path),
                    tier.min_units,
                    format!("tier thresholds must be strictly ascending (previous {})", prev),
                ));
            }
            previous = Some(tier.min_units);
            self.rate(&format!("{}.input_rate", tier_path), tier.input_rate)?;
            self.rate(&format!("{}.output_rate", tier_path), tier.output_rate)?;
        }

        if let Some(multiplier) = pricing.batch_multiplier {
            self.non_negative(&format!("{}.batch_multiplier", path), multiplier)?;
        }

        Ok(())
    }

    fn image(&self, path: &str, pricing: &ImagePricing) -> ConfigResult<()> {
        self.rate(&format!("{}.per_image_rate", path), pricing.per_image_rate)?;

        let mut previous: Option<u64> = None;
        for (i, tier) in pricing.count_tiers.iter().enumerate() {
            let tier_path = format!("{}.count_tiers[{}]", path, i);
            if let Some(prev) = previous
                && tier.min_count <= prev
            {
                return Err(self.fail(
                    format!("{}.min_count", tier_path),
                    tier.min_count,
                    format!("count tiers must be strictly ascending (previous {})", prev),
                ));
            }
            previous = Some(tier.min_count);
            self.rate(&format!("{}.per_image_rate", tier_path), tier.per_image_rate)?;
        }

        for (resolution, rate) in &pricing.resolutions {
            self.rate(&format!("{}.resolutions.{}", path, resolution), *rate)?;
        }

        Ok(())
    }

    fn grounding(&self, path: &str, raw: GroundingRecord) -> ConfigResult<GroundingPricing> {
        self.rate(&format!("{}.per_thousand_queries", path), raw.per_thousand_queries)?;
        let billing_model: BillingModel = raw
            .billing_model
            .parse()
            .map_err(|message: String| {
                self.fail(format!("{}.billing_model", path), &raw.billing_model, message)
            })?;

        Ok(GroundingPricing {
            per_thousand_queries: raw.per_thousand_queries,
            billing_model,
            batch_grounding_ok: raw.batch_grounding_ok,
        })
    }

    fn credit(&self, credit: &CreditPricing) -> ConfigResult<()> {
        self.rate(
            "credit_pricing.base_cost_per_request",
            credit.base_cost_per_request,
        )?;
        for (name, factor) in &credit.multipliers {
            self.non_negative(&format!("credit_pricing.multipliers.{}", name), *factor)?;
        }
        Ok(())
    }

    fn subscription(&self, path: &str, tier: &SubscriptionTier) -> ConfigResult<()> {
        self.non_negative(&format!("{}.monthly_price", path), tier.monthly_price)
    }
}
