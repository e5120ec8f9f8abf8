//! Rate selection and cost calculation.
//!
//! Nothing here returns an error: unresolvable identifiers produce results
//! flagged `unknown`, and input anomalies are clamped and reported through
//! the result's `warnings`.

mod breakdown;
mod calculator;
mod rate;
mod usage;

pub use breakdown::{AppliedRates, CostBreakdown, CreditCostBreakdown, ImageCostBreakdown};
pub use calculator::CostCalculator;
pub use rate::{DEFAULT_TIER, SelectedRate, select_rate};
pub use usage::{CalculateOptions, TokenUsage};

pub const WARN_TOKEN_OVERFLOW: &str = "token count overflow detected - using clamped value";
pub const WARN_CACHED_CLAMPED: &str = "cached token count exceeds input total - clamped";
pub const WARN_GROUNDING_BATCH_EXCLUDED: &str =
    "grounding cost excluded in batch mode for this model";
pub const WARN_GROUNDING_UNPRICED: &str = "no grounding pricing found for this model";
pub const WARN_IMAGE_RESOLUTION: &str =
    "image resolution not priced - using count or base rate";
pub const WARN_UNKNOWN_CREDIT_MULTIPLIER: &str =
    "unrecognized credit multiplier - billed at base cost";
