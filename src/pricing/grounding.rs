use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Unit in which grounding usage is counted.
///
/// The engine multiplies whatever unit the caller supplies; callers must pass
/// queries for `PerQuery` entries and prompts for `PerPrompt` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BillingModel {
    PerQuery,
    PerPrompt,
}

impl BillingModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PerQuery => "PerQuery",
            Self::PerPrompt => "PerPrompt",
        }
    }
}

impl fmt::Display for BillingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillingModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PerQuery" | "per_query" => Ok(Self::PerQuery),
            "PerPrompt" | "per_prompt" => Ok(Self::PerPrompt),
            other => Err(format!(
                "unrecognized billing model '{}' (expected PerQuery or PerPrompt)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundingPricing {
    pub per_thousand_queries: Decimal,
    pub billing_model: BillingModel,
    #[serde(default)]
    pub batch_grounding_ok: bool,
}

impl GroundingPricing {
    pub fn new(per_thousand_queries: Decimal, billing_model: BillingModel) -> Self {
        Self {
            per_thousand_queries,
            billing_model,
            batch_grounding_ok: false,
        }
    }

    pub fn allow_batch(mut self) -> Self {
        self.batch_grounding_ok = true;
        self
    }
}
