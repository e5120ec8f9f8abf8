//! Prelude module for convenient imports.
//!
//! ```rust
//! use pricebook::prelude::*;
//! ```

pub use crate::Error;
pub use crate::Result;

// Engine
pub use crate::engine::PricingEngine;

// Catalog
pub use crate::catalog::{Catalog, CatalogBuilder, MatchKind, Namespace, Resolution};

// Configuration
pub use crate::config::{
    ConfigError, ConfigSource, DirectorySource, EmbeddedSource, EngineConfig, MemorySource,
};

// Costs
pub use crate::cost::{
    CalculateOptions, CostBreakdown, CreditCostBreakdown, ImageCostBreakdown, TokenUsage,
};

// Pricing records
pub use crate::pricing::{BatchCacheRule, BillingModel, ModelPricing};
