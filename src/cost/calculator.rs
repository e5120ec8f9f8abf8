//! Token, image and credit cost calculation against one catalog.

use rust_decimal::Decimal;

use super::breakdown::{AppliedRates, CostBreakdown, CreditCostBreakdown, ImageCostBreakdown};
use super::rate::select_rate;
use super::usage::{CalculateOptions, NormalizedUsage, TokenUsage};
use super::{
    WARN_GROUNDING_BATCH_EXCLUDED, WARN_GROUNDING_UNPRICED, WARN_IMAGE_RESOLUTION,
    WARN_UNKNOWN_CREDIT_MULTIPLIER,
};
use crate::catalog::{Catalog, Resolved};
use crate::config::{DEFAULT_DECIMAL_PLACES, MAX_DECIMAL_PLACES};
use crate::pricing::{
    BatchCacheRule, GROUNDING_UNITS_PER_RATE, GroundingPricing, ModelPricing, UNITS_PER_RATE,
    qualified_key,
};

/// Borrowing calculator; cheap to create per call.
#[derive(Debug, Clone, Copy)]
pub struct CostCalculator<'a> {
    catalog: &'a Catalog,
    decimal_places: u32,
}

/// The four token items of a breakdown.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TokenItems {
    standard: Decimal,
    cached: Decimal,
    output: Decimal,
    thinking: Decimal,
}

impl TokenItems {
    fn sum(&self) -> Decimal {
        self.standard
            .saturating_add(self.cached)
            .saturating_add(self.output)
            .saturating_add(self.thinking)
    }
}

impl<'a> CostCalculator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            decimal_places: DEFAULT_DECIMAL_PLACES,
        }
    }

    /// Capped at [`MAX_DECIMAL_PLACES`].
    pub fn with_decimal_places(mut self, decimal_places: u32) -> Self {
        self.decimal_places = decimal_places.min(MAX_DECIMAL_PLACES);
        self
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// Bill a plain input/output/cached triple.
    pub fn calculate(
        &self,
        identifier: &str,
        input_tokens: i64,
        output_tokens: i64,
        cached_tokens: i64,
        options: CalculateOptions,
    ) -> CostBreakdown {
        let usage = TokenUsage::new(input_tokens, output_tokens).with_cached_tokens(cached_tokens);
        self.calculate_usage(identifier, &usage, options)
    }

    pub fn calculate_usage(
        &self,
        identifier: &str,
        usage: &TokenUsage,
        options: CalculateOptions,
    ) -> CostBreakdown {
        let Some(hit) = self.catalog.find_model(identifier) else {
            tracing::debug!(model = %identifier, "no pricing found for model");
            return CostBreakdown::unknown(options.batch_mode);
        };
        tracing::debug!(
            model = %identifier,
            provider = %hit.entry.provider,
            matched = %hit.matched_key,
            kind = ?hit.kind,
            "resolved model pricing"
        );

        let mut warnings = Vec::new();
        let usage = usage.normalize(&mut warnings);
        let pricing = &hit.entry.pricing;

        let rate = select_rate(pricing, u64::try_from(usage.input).unwrap_or_default());
        let cached_rate = pricing.cached_rate(rate.input_rate);
        let undiscounted = TokenItems {
            standard: per_unit(usage.standard, rate.input_rate, UNITS_PER_RATE),
            cached: per_unit(usage.cached, cached_rate, UNITS_PER_RATE),
            output: per_unit(usage.output, rate.output_rate, UNITS_PER_RATE),
            thinking: per_unit(usage.thinking, rate.output_rate, UNITS_PER_RATE),
        };

        let multiplier = pricing.batch_multiplier();
        let (items, batch_discount) = if options.batch_mode && multiplier != Decimal::ONE {
            apply_batch(undiscounted, multiplier, pricing.batch_cache_rule)
        } else {
            (undiscounted, Decimal::ZERO)
        };

        let (grounding_cost, grounding_rate) =
            self.grounding_cost(identifier, &hit, &usage, options, &mut warnings);

        let total = items
            .sum()
            .saturating_add(grounding_cost)
            .max(Decimal::ZERO)
            .round_dp(self.decimal_places);

        CostBreakdown {
            provider: Some(hit.entry.provider.clone()),
            model: Some(hit.entry.name.clone()),
            match_kind: Some(hit.kind),
            standard_input_cost: items.standard,
            cached_input_cost: items.cached,
            output_cost: items.output,
            thinking_cost: items.thinking,
            grounding_cost,
            tier_applied: rate.tier_id,
            batch_discount_amount: batch_discount,
            batch_mode: options.batch_mode,
            total_cost: total,
            warnings,
            unknown: false,
            rates: Some(AppliedRates {
                input_rate: rate.input_rate,
                cached_input_rate: cached_rate,
                output_rate: rate.output_rate,
                batch_multiplier: multiplier,
                grounding_rate,
            }),
        }
    }

    /// Grounding is looked up under the model's own provider only.
    fn grounding_cost(
        &self,
        identifier: &str,
        hit: &Resolved<'_, ModelPricing>,
        usage: &NormalizedUsage,
        options: CalculateOptions,
        warnings: &mut Vec<String>,
    ) -> (Decimal, Option<Decimal>) {
        if usage.grounding == 0 {
            return (Decimal::ZERO, None);
        }

        let provider = hit.entry.provider.as_str();
        let identifier = identifier.trim();
        let query = if identifier.starts_with(&qualified_key(provider, "")) {
            identifier.to_string()
        } else {
            qualified_key(provider, identifier)
        };

        let Some(grounding) = self.catalog.find_provider_grounding(provider, &query) else {
            tracing::debug!(query = %query, "no grounding pricing for model");
            warnings.push(WARN_GROUNDING_UNPRICED.to_string());
            return (Decimal::ZERO, None);
        };
        let pricing: &GroundingPricing = &grounding.entry.pricing;

        if options.batch_mode && !pricing.batch_grounding_ok {
            tracing::debug!(
                query = %query,
                units = usage.grounding,
                "grounding excluded in batch mode"
            );
            warnings.push(WARN_GROUNDING_BATCH_EXCLUDED.to_string());
            return (Decimal::ZERO, Some(pricing.per_thousand_queries));
        }

        let cost = per_unit(
            usage.grounding,
            pricing.per_thousand_queries,
            GROUNDING_UNITS_PER_RATE,
        );
        (cost, Some(pricing.per_thousand_queries))
    }

    pub fn calculate_image_cost(&self, identifier: &str, count: i64) -> ImageCostBreakdown {
        self.image_cost(identifier, count, None)
    }

    /// Like [`calculate_image_cost`](Self::calculate_image_cost) with a
    /// resolution-specific rate when one is configured.
    pub fn calculate_image_cost_at(
        &self,
        identifier: &str,
        count: i64,
        resolution: &str,
    ) -> ImageCostBreakdown {
        self.image_cost(identifier, count, Some(resolution))
    }

    fn image_cost(
        &self,
        identifier: &str,
        count: i64,
        resolution: Option<&str>,
    ) -> ImageCostBreakdown {
        let Some(hit) = self.catalog.find_image_model(identifier) else {
            tracing::debug!(model = %identifier, "no pricing found for image model");
            return ImageCostBreakdown::unknown();
        };

        let count = u64::try_from(count).unwrap_or_default();
        let rate = hit.entry.pricing.rate_for(count, resolution);

        let mut warnings = Vec::new();
        if let Some(resolution) = resolution
            && rate.tier != resolution
        {
            tracing::debug!(
                model = %identifier,
                resolution = %resolution,
                "image resolution not priced"
            );
            warnings.push(WARN_IMAGE_RESOLUTION.to_string());
        }

        let total = Decimal::from(count)
            .saturating_mul(rate.rate)
            .round_dp(self.decimal_places);

        ImageCostBreakdown {
            provider: Some(hit.entry.provider.clone()),
            model: Some(hit.entry.name.clone()),
            match_kind: Some(hit.kind),
            image_count: count,
            per_image_rate: rate.rate,
            tier_applied: rate.tier,
            total_cost: total,
            warnings,
            unknown: false,
        }
    }

    /// Bill one credit-priced request.
    ///
    /// `""` and `"base"` bill the base cost. An unrecognized multiplier still
    /// bills the base cost but flags the result as unknown.
    pub fn calculate_credit_cost(
        &self,
        provider: &str,
        multiplier_name: &str,
    ) -> CreditCostBreakdown {
        let provider = provider.trim();
        let multiplier_name = multiplier_name.trim();

        let Some(credit) = self.catalog.credit_pricing_ref(provider) else {
            tracing::debug!(provider = %provider, "provider has no credit pricing");
            return CreditCostBreakdown {
                provider: provider.to_string(),
                multiplier_name: multiplier_name.to_string(),
                unknown: true,
                ..Default::default()
            };
        };

        let base = credit.base_cost_per_request;
        let multiplier = credit.multiplier(multiplier_name);
        let mut warnings = Vec::new();
        let total = match multiplier {
            Some(factor) => base.saturating_mul(factor),
            None => {
                tracing::debug!(
                    provider = %provider,
                    multiplier = %multiplier_name,
                    "unrecognized credit multiplier"
                );
                warnings.push(WARN_UNKNOWN_CREDIT_MULTIPLIER.to_string());
                base
            }
        };

        CreditCostBreakdown {
            provider: provider.to_string(),
            multiplier_name: multiplier_name.to_string(),
            base_cost: base,
            multiplier,
            total_cost: total.round_dp(self.decimal_places),
            warnings,
            unknown: multiplier.is_none(),
        }
    }
}

fn per_unit(units: i64, rate: Decimal, per: Decimal) -> Decimal {
    Decimal::from(units).saturating_mul(rate) / per
}

/// Apply a batch multiplier under `rule`; returns the discounted items and
/// the amount the batch took off their subtotal.
fn apply_batch(
    items: TokenItems,
    multiplier: Decimal,
    rule: BatchCacheRule,
) -> (TokenItems, Decimal) {
    let scale = |cost: Decimal| cost.saturating_mul(multiplier);

    let after = match rule {
        // Batch wins: the cached item is discounted on top of its cache rate.
        BatchCacheRule::Independent | BatchCacheRule::BatchPrecedence => TokenItems {
            standard: scale(items.standard),
            cached: scale(items.cached),
            output: scale(items.output),
            thinking: scale(items.thinking),
        },
        BatchCacheRule::CachePrecedence => TokenItems {
            standard: scale(items.standard),
            output: scale(items.output),
            thinking: scale(items.thinking),
            ..items
        },
    };
    (after, items.sum().saturating_sub(after.sum()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GroundingRecord, ProviderRecord};
    use crate::cost::{WARN_CACHED_CLAMPED, WARN_TOKEN_OVERFLOW};
    use crate::pricing::{CreditPricing, ImagePricing, PricingTier};
    use rust_decimal_macros::dec;

    fn batch_model(rule: BatchCacheRule) -> ModelPricing {
        ModelPricing::new(dec!(1), dec!(2))
            .with_cache_multiplier(dec!(0.10))
            .with_batch(dec!(0.5), rule)
    }

    fn catalog() -> Catalog {
        let acme = ProviderRecord::new("acme")
            .model("independent", batch_model(BatchCacheRule::Independent))
            .model("batch-first", batch_model(BatchCacheRule::BatchPrecedence))
            .model("cache-first", batch_model(BatchCacheRule::CachePrecedence))
            .model(
                "tiered",
                ModelPricing::new(dec!(1), dec!(4))
                    .with_tier(PricingTier::new(200_000, dec!(2), dec!(8))),
            )
            .model("search-model", ModelPricing::new(dec!(1), dec!(1)))
            .grounding(
                "search",
                GroundingRecord {
                    per_thousand_queries: dec!(35),
                    billing_model: "PerQuery".into(),
                    batch_grounding_ok: false,
                },
            )
            .image_model(
                "painter",
                ImagePricing::new(dec!(0.04)).with_resolution("hd", dec!(0.08)),
            )
            .credit_pricing(CreditPricing::new(dec!(0.02)).with_multiplier("premium", dec!(3)));

        Catalog::builder().record("acme.json", acme).build().unwrap()
    }

    fn worked(calc: &CostCalculator<'_>, model: &str) -> CostBreakdown {
        calc.calculate(model, 2_000_000, 0, 1_000_000, CalculateOptions::batch())
    }

    #[test]
    fn test_batch_precedence_worked_example() {
        let catalog = catalog();
        let calc = CostCalculator::new(&catalog);
        let breakdown = worked(&calc, "batch-first");

        assert_eq!(breakdown.standard_input_cost, dec!(0.5));
        assert_eq!(breakdown.cached_input_cost, dec!(0.05));
        assert_eq!(breakdown.batch_discount_amount, dec!(0.55));
        assert_eq!(breakdown.total_cost, dec!(0.55));
    }

    #[test]
    fn test_cache_precedence_worked_example() {
        let catalog = catalog();
        let calc = CostCalculator::new(&catalog);
        let breakdown = worked(&calc, "cache-first");

        assert_eq!(breakdown.standard_input_cost, dec!(0.5));
        assert_eq!(breakdown.cached_input_cost, dec!(0.1));
        assert_eq!(breakdown.batch_discount_amount, dec!(0.5));
        assert_eq!(breakdown.total_cost, dec!(0.60));
    }

    #[test]
    fn test_independent_discounts_every_item() {
        let catalog = catalog();
        let calc = CostCalculator::new(&catalog);
        let breakdown = worked(&calc, "independent");

        assert_eq!(breakdown.standard_input_cost, dec!(0.5));
        assert_eq!(breakdown.cached_input_cost, dec!(0.05));
        assert_eq!(breakdown.batch_discount_amount, dec!(0.55));
        assert_eq!(breakdown.total_cost, dec!(0.55));
    }

    #[test]
    fn test_total_is_sum_of_items_for_every_rule() {
        let catalog = catalog();
        let calc = CostCalculator::new(&catalog);
        let usage = TokenUsage::new(2_000_000, 1_000_000)
            .with_cached_tokens(1_000_000)
            .with_thinking_tokens(500_000);

        for model in ["independent", "batch-first", "cache-first"] {
            for options in [CalculateOptions::default(), CalculateOptions::batch()] {
                let breakdown = calc.calculate_usage(model, &usage, options);
                assert_eq!(
                    breakdown.total_cost,
                    breakdown.token_subtotal() + breakdown.grounding_cost,
                    "{} batch={}",
                    model,
                    options.batch_mode
                );
            }
        }
    }

    #[test]
    fn test_discount_matches_unbatched_difference() {
        let catalog = catalog();
        let calc = CostCalculator::new(&catalog);
        let usage = TokenUsage::new(2_000_000, 1_000_000).with_cached_tokens(1_000_000);

        for model in ["independent", "batch-first", "cache-first"] {
            let online = calc.calculate_usage(model, &usage, CalculateOptions::default());
            let batch = calc.calculate_usage(model, &usage, CalculateOptions::batch());
            assert_eq!(
                batch.batch_discount_amount,
                online.total_cost - batch.total_cost,
                "{}",
                model
            );
        }
    }

    #[test]
    fn test_no_batch_discount_outside_batch_mode() {
        let catalog = catalog();
        let calc = CostCalculator::new(&catalog);
        let breakdown = calc.calculate(
            "batch-first",
            2_000_000,
            1_000_000,
            1_000_000,
            CalculateOptions::default(),
        );

        assert_eq!(breakdown.batch_discount_amount, Decimal::ZERO);
        assert_eq!(breakdown.output_cost, dec!(2));
        assert_eq!(breakdown.total_cost, dec!(3.1));
        assert!(!breakdown.batch_mode);
    }

    #[test]
    fn test_thinking_billed_at_output_rate() {
        let catalog = catalog();
        let calc = CostCalculator::new(&catalog);
        let usage = TokenUsage::new(0, 500_000).with_thinking_tokens(250_000);
        let breakdown = calc.calculate_usage("tiered", &usage, CalculateOptions::default());

        assert_eq!(breakdown.output_cost, dec!(2));
        assert_eq!(breakdown.thinking_cost, dec!(1));
    }

    #[test]
    fn test_tier_selected_by_total_input() {
        let catalog = catalog();
        let calc = CostCalculator::new(&catalog);
        let usage = TokenUsage::new(150_000, 0).with_tool_use_prompt_tokens(50_000);
        let breakdown = calc.calculate_usage("tiered", &usage, CalculateOptions::default());

        assert_eq!(breakdown.tier_applied, "tier-200000");
        assert_eq!(breakdown.standard_input_cost, dec!(0.4));
    }

    #[test]
    fn test_unknown_model() {
        let catalog = catalog();
        let breakdown = CostCalculator::new(&catalog).calculate(
            "nope",
            10,
            10,
            0,
            CalculateOptions::default(),
        );
        assert!(breakdown.unknown);
        assert_eq!(breakdown.total_cost, Decimal::ZERO);
    }

    #[test]
    fn test_grounding_excluded_in_batch_mode() {
        let catalog = catalog();
        let calc = CostCalculator::new(&catalog);
        let usage = TokenUsage::new(0, 0).with_grounding_units(1_000);

        let batch = calc.calculate_usage("search-model", &usage, CalculateOptions::batch());
        assert_eq!(batch.grounding_cost, Decimal::ZERO);
        assert!(batch.has_warning(WARN_GROUNDING_BATCH_EXCLUDED));

        let online = calc.calculate_usage("search-model", &usage, CalculateOptions::default());
        assert_eq!(online.grounding_cost, dec!(35));
        assert_eq!(online.total_cost, dec!(35));
        assert!(online.warnings.is_empty());
    }

    #[test]
    fn test_grounding_unpriced_warns() {
        let catalog = catalog();
        let usage = TokenUsage::new(1_000_000, 0).with_grounding_units(3);
        let breakdown = CostCalculator::new(&catalog).calculate_usage(
            "tiered",
            &usage,
            CalculateOptions::default(),
        );

        assert!(!breakdown.unknown);
        assert_eq!(breakdown.total_cost, dec!(2));
        assert!(breakdown.has_warning(WARN_GROUNDING_UNPRICED));
    }

    #[test]
    fn test_overflow_and_clamp_warnings() {
        let catalog = catalog();
        let calc = CostCalculator::new(&catalog);
        let usage = TokenUsage::new(i64::MAX, 0).with_tool_use_prompt_tokens(1);
        let breakdown = calc.calculate_usage("tiered", &usage, CalculateOptions::default());
        assert!(breakdown.has_warning(WARN_TOKEN_OVERFLOW));
        assert!(breakdown.total_cost > Decimal::ZERO);

        let clamped = calc.calculate("tiered", 10, 0, 50, CalculateOptions::default());
        assert!(clamped.has_warning(WARN_CACHED_CLAMPED));
        assert_eq!(clamped.standard_input_cost, Decimal::ZERO);
    }

    #[test]
    fn test_total_rounding() {
        let catalog = catalog();
        let calc = CostCalculator::new(&catalog).with_decimal_places(2);
        let breakdown = calc.calculate("tiered", 1_234, 0, 0, CalculateOptions::default());
        assert_eq!(breakdown.standard_input_cost, dec!(0.001234));
        assert_eq!(breakdown.total_cost, dec!(0.00));
    }

    #[test]
    fn test_decimal_places_capped() {
        let catalog = catalog();
        let calc = CostCalculator::new(&catalog).with_decimal_places(40);
        assert_eq!(calc.decimal_places, MAX_DECIMAL_PLACES);

        let breakdown = calc.calculate("tiered", 1_234, 0, 0, CalculateOptions::default());
        assert_eq!(breakdown.total_cost, dec!(0.001234));
    }

    #[test]
    fn test_image_cost() {
        let catalog = catalog();
        let calc = CostCalculator::new(&catalog);

        let plain = calc.calculate_image_cost("painter", 5);
        assert_eq!(plain.total_cost, dec!(0.20));
        assert_eq!(plain.tier_applied, "default");

        let hd = calc.calculate_image_cost_at("painter", 5, "hd");
        assert_eq!(hd.total_cost, dec!(0.40));
        assert!(hd.warnings.is_empty());

        let odd = calc.calculate_image_cost_at("painter", 5, "8k");
        assert_eq!(odd.total_cost, dec!(0.20));
        assert!(odd.warnings.iter().any(|w| w == WARN_IMAGE_RESOLUTION));

        assert!(calc.calculate_image_cost("sculptor", 1).unknown);
        assert_eq!(calc.calculate_image_cost("painter", -4).total_cost, Decimal::ZERO);
    }

    #[test]
    fn test_credit_cost() {
        let catalog = catalog();
        let calc = CostCalculator::new(&catalog);

        let base = calc.calculate_credit_cost("acme", "");
        assert_eq!(base.total_cost, dec!(0.02));
        assert!(!base.unknown);
        assert_eq!(calc.calculate_credit_cost("acme", "base").total_cost, dec!(0.02));

        let premium = calc.calculate_credit_cost("acme", "premium");
        assert_eq!(premium.total_cost, dec!(0.06));

        let odd = calc.calculate_credit_cost("acme", "ultra");
        assert_eq!(odd.total_cost, dec!(0.02));
        assert!(odd.unknown);
        assert!(odd.multiplier.is_none());

        let missing = calc.calculate_credit_cost("nobody", "");
        assert!(missing.unknown);
        assert_eq!(missing.total_cost, Decimal::ZERO);
    }
}
