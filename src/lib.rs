//! # pricebook
//!
//! Pricing catalog resolution and cost calculation for usage-billed AI
//! providers.
//!
//! Provider pricing documents (JSON or YAML) are validated and merged once
//! into an immutable [`Catalog`]. Model identifiers, including dated or
//! suffixed variants, resolve against it by exact key or boundary-safe
//! prefix, and a [`PricingEngine`] turns usage counts into an itemized
//! [`CostBreakdown`] under tiered rates, cache and batch discounts, grounding
//! and credit billing.
//!
//! ## Quick Start
//!
//! ```rust
//! use pricebook::{CalculateOptions, EngineConfig, MemorySource, PricingEngine};
//! use rust_decimal_macros::dec;
//!
//! # fn main() -> Result<(), pricebook::Error> {
//! let source = MemorySource::new().document(
//!     "openai.json",
//!     r#"{"provider_id": "openai",
//!         "models": {"gpt-4o": {"input_rate": 2.5, "output_rate": 10}}}"#,
//! );
//! let engine = PricingEngine::from_source(&source, EngineConfig::default())?;
//!
//! let cost = engine.calculate(
//!     "gpt-4o-2024-08-06",
//!     1_000_000,
//!     100_000,
//!     0,
//!     CalculateOptions::default(),
//! );
//! assert_eq!(cost.total_cost, dec!(3.5));
//! assert!(!cost.unknown);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod catalog;
pub mod config;
pub mod cost;
pub mod engine;
pub mod global;
pub mod prelude;
pub mod pricing;

pub use catalog::{
    AmbiguousName, Catalog, CatalogBuilder, CatalogStats, Match, MatchKind, Namespace, Resolution,
};
pub use config::{
    ConfigError, ConfigResult, ConfigSource, DirectorySource, EmbeddedSource, EngineConfig,
    MemorySource, PricingValidator, ProviderRecord, RawDocument,
};
pub use cost::{
    CalculateOptions, CostBreakdown, CostCalculator, CreditCostBreakdown, ImageCostBreakdown,
    SelectedRate, TokenUsage, select_rate,
};
pub use engine::PricingEngine;
pub use pricing::{
    BatchCacheRule, BillingModel, CreditPricing, GroundingPricing, ImagePricing, ModelPricing,
    PricingTier, ProviderEntry, ProviderMetadata, SubscriptionTier,
};

/// Error type for pricebook operations.
///
/// Only construction and setup fail; cost calculation reports anomalies
/// in-band through `unknown` and `warnings`.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Pricing configuration could not be loaded or validated.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The process-wide engine has not been installed.
    #[error("Pricing engine not initialized")]
    NotInitialized,

    /// The process-wide engine was already installed.
    #[error("Pricing engine already initialized")]
    AlreadyInitialized,
}

impl Error {
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Underlying configuration error, if any.
    pub fn config_error(&self) -> Option<&ConfigError> {
        match self {
            Error::Config(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
