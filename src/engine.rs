//! Thread-safe pricing engine over a swappable immutable catalog.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::catalog::{
    AmbiguousName, Catalog, CatalogBuilder, CatalogStats, Match, Namespace, Resolution,
};
use crate::config::{ConfigResult, ConfigSource, EngineConfig};
use crate::cost::{
    CalculateOptions, CostBreakdown, CostCalculator, CreditCostBreakdown, ImageCostBreakdown,
    TokenUsage,
};
use crate::pricing::{
    CreditPricing, GroundingPricing, ImagePricing, ModelPricing, ProviderEntry, ProviderMetadata,
    SubscriptionTier,
};

/// Answers resolution and cost queries from any number of threads.
///
/// Each call takes a snapshot of the current catalog under a short read lock
/// and computes against it without holding the lock. A replacement catalog
/// becomes visible to calls that start after [`replace_catalog`] returns.
///
/// [`replace_catalog`]: Self::replace_catalog
#[derive(Debug)]
pub struct PricingEngine {
    catalog: RwLock<Arc<Catalog>>,
    config: EngineConfig,
}

impl PricingEngine {
    pub fn new(catalog: Catalog, config: EngineConfig) -> Self {
        Self {
            catalog: RwLock::new(Arc::new(catalog)),
            config,
        }
    }

    /// Load, validate and index every document of `source`.
    pub fn from_source(source: &dyn ConfigSource, config: EngineConfig) -> ConfigResult<Self> {
        let catalog = CatalogBuilder::with_config(&config).source(source)?.build()?;
        tracing::info!(
            source = %source.name(),
            providers = catalog.stats().providers,
            "pricing engine ready"
        );
        Ok(Self::new(catalog, config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current catalog; stays valid after a later swap.
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog.read().unwrap_or_else(|e| e.into_inner()))
    }

    /// Substitute a fully built catalog and return the previous one.
    pub fn replace_catalog(&self, catalog: Catalog) -> Arc<Catalog> {
        let stats = catalog.stats();
        let next = Arc::new(catalog);
        let previous = {
            let mut slot = self.catalog.write().unwrap_or_else(|e| e.into_inner());
            std::mem::replace(&mut *slot, next)
        };
        tracing::info!(
            providers = stats.providers,
            models = stats.models,
            previous_providers = previous.stats().providers,
            "pricing catalog replaced"
        );
        previous
    }

    fn calculator<'a>(&self, catalog: &'a Catalog) -> CostCalculator<'a> {
        CostCalculator::new(catalog).with_decimal_places(self.config.decimal_places)
    }

    pub fn calculate(
        &self,
        identifier: &str,
        input_tokens: i64,
        output_tokens: i64,
        cached_tokens: i64,
        options: CalculateOptions,
    ) -> CostBreakdown {
        let catalog = self.catalog();
        self.calculator(&catalog).calculate(
            identifier,
            input_tokens,
            output_tokens,
            cached_tokens,
            options,
        )
    }

    pub fn calculate_usage(
        &self,
        identifier: &str,
        usage: &TokenUsage,
        options: CalculateOptions,
    ) -> CostBreakdown {
        let catalog = self.catalog();
        self.calculator(&catalog).calculate_usage(identifier, usage, options)
    }

    pub fn calculate_image_cost(&self, identifier: &str, count: i64) -> ImageCostBreakdown {
        let catalog = self.catalog();
        self.calculator(&catalog).calculate_image_cost(identifier, count)
    }

    pub fn calculate_image_cost_at(
        &self,
        identifier: &str,
        count: i64,
        resolution: &str,
    ) -> ImageCostBreakdown {
        let catalog = self.catalog();
        self.calculator(&catalog)
            .calculate_image_cost_at(identifier, count, resolution)
    }

    pub fn calculate_credit_cost(
        &self,
        provider: &str,
        multiplier_name: &str,
    ) -> CreditCostBreakdown {
        let catalog = self.catalog();
        self.calculator(&catalog)
            .calculate_credit_cost(provider, multiplier_name)
    }

    pub fn lookup(&self, namespace: Namespace, identifier: &str) -> Option<Match> {
        self.catalog().lookup(namespace, identifier)
    }

    pub fn resolve_model(&self, identifier: &str) -> Option<Resolution<ModelPricing>> {
        self.catalog().resolve_model(identifier)
    }

    pub fn resolve_image_model(&self, identifier: &str) -> Option<Resolution<ImagePricing>> {
        self.catalog().resolve_image_model(identifier)
    }

    pub fn resolve_grounding(&self, identifier: &str) -> Option<Resolution<GroundingPricing>> {
        self.catalog().resolve_grounding(identifier)
    }

    pub fn provider_ids(&self) -> Vec<String> {
        self.catalog().provider_ids()
    }

    pub fn provider(&self, provider: &str) -> Option<ProviderEntry> {
        self.catalog().provider(provider)
    }

    pub fn provider_metadata(&self, provider: &str) -> Option<ProviderMetadata> {
        self.catalog().provider_metadata(provider)
    }

    pub fn credit_pricing(&self, provider: &str) -> Option<CreditPricing> {
        self.catalog().credit_pricing(provider)
    }

    pub fn subscription_tiers(
        &self,
        provider: &str,
    ) -> Option<BTreeMap<String, SubscriptionTier>> {
        self.catalog().subscription_tiers(provider)
    }

    pub fn ambiguous_names(&self, namespace: Namespace) -> Vec<AmbiguousName> {
        self.catalog().ambiguous_names(namespace)
    }

    pub fn stats(&self) -> CatalogStats {
        self.catalog().stats()
    }
}
