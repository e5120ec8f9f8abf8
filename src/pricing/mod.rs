//! Pricing records for models, image models, grounding and credit billing.

mod credit;
mod grounding;
mod image;
mod model;
mod provider;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub use credit::{BASE_MULTIPLIER_NAMES, CreditPricing, SubscriptionTier};
pub use grounding::{BillingModel, GroundingPricing};
pub use image::{ImagePricing, ImageRate, ImageTier};
pub use model::{BatchCacheRule, ModelPricing, PricingTier};
pub use provider::{ProviderEntry, ProviderMetadata, qualified_key};

/// Token rates are quoted per this many units.
pub const UNITS_PER_RATE: Decimal = dec!(1_000_000);

/// Grounding rates are quoted per this many queries or prompts.
pub const GROUNDING_UNITS_PER_RATE: Decimal = dec!(1_000);
