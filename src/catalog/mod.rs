//! The immutable pricing catalog and identifier resolution.
//!
//! Every entry is reachable through its provider-qualified key
//! (`"provider/identifier"`). Bare identifiers resolve to the first provider
//! in ascending id order that defines them; other definitions stay reachable
//! through their qualified keys and are reported by
//! [`Catalog::ambiguous_names`].
//!
//! Lookups try an exact key first and then the longest key that prefixes the
//! query at a separator boundary (`-`, `.`, `/`), so dated variants such as
//! `gpt-4o-2024-08-06` bill as `gpt-4o` while `gpt-45` never bills as `gpt-4`.

mod builder;
mod resolver;

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

pub use builder::CatalogBuilder;
pub use resolver::{MatchKind, SEPARATORS, is_boundary_prefix};

pub(crate) use resolver::{NamespaceIndex, Resolved};

use crate::pricing::{
    CreditPricing, GroundingPricing, ImagePricing, ModelPricing, ProviderEntry, ProviderMetadata,
    SubscriptionTier,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    Models,
    ImageModels,
    Grounding,
}

impl Namespace {
    pub const ALL: [Namespace; 3] = [Self::Models, Self::ImageModels, Self::Grounding];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Models => "models",
            Self::ImageModels => "image_models",
            Self::Grounding => "grounding",
        }
    }
}

/// Where an identifier landed, without the pricing payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub provider: String,
    pub name: String,
    pub matched_key: String,
    pub kind: MatchKind,
}

/// A resolved identifier with an owned copy of its pricing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution<T> {
    pub provider: String,
    pub name: String,
    pub matched_key: String,
    pub kind: MatchKind,
    pub pricing: T,
}

impl<T> Resolved<'_, T> {
    pub(crate) fn to_match(&self) -> Match {
        Match {
            provider: self.entry.provider.clone(),
            name: self.entry.name.clone(),
            matched_key: self.matched_key.to_string(),
            kind: self.kind,
        }
    }

    pub(crate) fn to_resolution(&self) -> Resolution<T>
    where
        T: Clone,
    {
        Resolution {
            provider: self.entry.provider.clone(),
            name: self.entry.name.clone(),
            matched_key: self.matched_key.to_string(),
            kind: self.kind,
            pricing: self.entry.pricing.clone(),
        }
    }
}

/// A bare identifier defined by more than one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbiguousName {
    pub name: String,
    /// Every defining provider, ascending; the first owns the bare key.
    pub providers: Vec<String>,
    pub resolved_to: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub providers: usize,
    pub models: usize,
    pub image_models: usize,
    pub grounding_prefixes: usize,
    pub ambiguous_names: usize,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    providers: BTreeMap<String, ProviderEntry>,
    models: NamespaceIndex<ModelPricing>,
    image_models: NamespaceIndex<ImagePricing>,
    grounding: NamespaceIndex<GroundingPricing>,
    ambiguous: HashMap<Namespace, Vec<AmbiguousName>>,
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    pub(crate) fn find_model(&self, identifier: &str) -> Option<Resolved<'_, ModelPricing>> {
        self.models.resolve(identifier.trim())
    }

    pub(crate) fn find_image_model(&self, identifier: &str) -> Option<Resolved<'_, ImagePricing>> {
        self.image_models.resolve(identifier.trim())
    }

    pub(crate) fn find_grounding(
        &self,
        identifier: &str,
    ) -> Option<Resolved<'_, GroundingPricing>> {
        self.grounding.resolve(identifier.trim())
    }

    /// Grounding resolution among `provider`'s own keys only.
    pub(crate) fn find_provider_grounding(
        &self,
        provider: &str,
        identifier: &str,
    ) -> Option<Resolved<'_, GroundingPricing>> {
        self.grounding.resolve_owned_by(identifier.trim(), provider)
    }

    pub(crate) fn credit_pricing_ref(&self, provider: &str) -> Option<&CreditPricing> {
        self.providers.get(provider)?.credit_pricing.as_ref()
    }

    /// Namespace-generic resolution.
    pub fn lookup(&self, namespace: Namespace, identifier: &str) -> Option<Match> {
        match namespace {
            Namespace::Models => self.find_model(identifier).map(|hit| hit.to_match()),
            Namespace::ImageModels => self.find_image_model(identifier).map(|hit| hit.to_match()),
            Namespace::Grounding => self.find_grounding(identifier).map(|hit| hit.to_match()),
        }
    }

    pub fn resolve_model(&self, identifier: &str) -> Option<Resolution<ModelPricing>> {
        self.find_model(identifier).map(|hit| hit.to_resolution())
    }

    pub fn resolve_image_model(&self, identifier: &str) -> Option<Resolution<ImagePricing>> {
        self.find_image_model(identifier).map(|hit| hit.to_resolution())
    }

    pub fn resolve_grounding(&self, identifier: &str) -> Option<Resolution<GroundingPricing>> {
        self.find_grounding(identifier).map(|hit| hit.to_resolution())
    }

    pub fn provider_ids(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    pub fn provider(&self, provider: &str) -> Option<ProviderEntry> {
        self.providers.get(provider).cloned()
    }

    pub fn provider_metadata(&self, provider: &str) -> Option<ProviderMetadata> {
        self.providers.get(provider).map(|p| p.metadata.clone())
    }

    pub fn credit_pricing(&self, provider: &str) -> Option<CreditPricing> {
        self.credit_pricing_ref(provider).cloned()
    }

    pub fn subscription_tiers(&self, provider: &str) -> Option<BTreeMap<String, SubscriptionTier>> {
        self.providers
            .get(provider)
            .map(|p| p.subscription_tiers.clone())
    }

    /// Qualified keys of every entry in a namespace, in catalog order.
    pub fn qualified_keys(&self, namespace: Namespace) -> Vec<String> {
        fn keys<T>(index: &NamespaceIndex<T>) -> Vec<String> {
            index
                .entries()
                .iter()
                .map(|e| crate::pricing::qualified_key(&e.provider, &e.name))
                .collect()
        }
        match namespace {
            Namespace::Models => keys(&self.models),
            Namespace::ImageModels => keys(&self.image_models),
            Namespace::Grounding => keys(&self.grounding),
        }
    }

    pub fn ambiguous_names(&self, namespace: Namespace) -> Vec<AmbiguousName> {
        self.ambiguous.get(&namespace).cloned().unwrap_or_default()
    }

    pub fn is_ambiguous(&self, namespace: Namespace, name: &str) -> bool {
        self.ambiguous
            .get(&namespace)
            .is_some_and(|names| names.iter().any(|a| a.name == name))
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            providers: self.providers.len(),
            models: self.models.len(),
            image_models: self.image_models.len(),
            grounding_prefixes: self.grounding.len(),
            ambiguous_names: self.ambiguous.values().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
