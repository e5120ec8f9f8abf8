//! Merges validated provider records into one immutable [`Catalog`].

use std::collections::{BTreeMap, HashMap};

use super::resolver::NamespaceIndex;
use super::{AmbiguousName, Catalog, Namespace};
use crate::config::{
    ConfigError, ConfigResult, ConfigSource, EngineConfig, PricingValidator, ProviderRecord,
};
use crate::pricing::{ProviderEntry, qualified_key};

/// Collects raw provider records and builds a catalog in one step.
///
/// Nothing is visible until [`build`](Self::build) succeeds; any rejected
/// record fails the whole build.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    validator: PricingValidator,
    records: Vec<(String, ProviderRecord)>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            validator: PricingValidator::from_config(config),
            records: Vec::new(),
        }
    }

    pub fn validator(mut self, validator: PricingValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn record(mut self, document: impl Into<String>, record: ProviderRecord) -> Self {
        self.records.push((document.into(), record));
        self
    }

    pub fn records(mut self, records: impl IntoIterator<Item = (String, ProviderRecord)>) -> Self {
        self.records.extend(records);
        self
    }

    /// Decode one JSON or YAML document and queue it.
    pub fn document(self, document: &str, bytes: &[u8]) -> ConfigResult<Self> {
        let record = ProviderRecord::parse(document, bytes)?;
        Ok(self.record(document, record))
    }

    pub fn source(mut self, source: &dyn ConfigSource) -> ConfigResult<Self> {
        for doc in source.load()? {
            self = self.document(&doc.name, &doc.bytes)?;
        }
        Ok(self)
    }

    pub fn build(self) -> ConfigResult<Catalog> {
        let mut providers: BTreeMap<String, (String, ProviderEntry)> = BTreeMap::new();
        for (document, record) in self.records {
            let entry = self.validator.validate(&document, record)?;
            if let Some((first, _)) = providers.get(&entry.provider_id) {
                return Err(ConfigError::DuplicateProvider {
                    provider: entry.provider_id,
                    first: first.clone(),
                    second: document,
                });
            }
            providers.insert(entry.provider_id.clone(), (document, entry));
        }

        let providers: BTreeMap<String, ProviderEntry> = providers
            .into_iter()
            .map(|(id, (_, entry))| (id, entry))
            .collect();

        let (models, ambiguous_models) =
            index_namespace(Namespace::Models, &providers, |p| &p.models);
        let (image_models, ambiguous_images) =
            index_namespace(Namespace::ImageModels, &providers, |p| &p.image_models);
        let (grounding, ambiguous_grounding) =
            index_namespace(Namespace::Grounding, &providers, |p| &p.grounding);

        let mut ambiguous = HashMap::new();
        ambiguous.insert(Namespace::Models, ambiguous_models);
        ambiguous.insert(Namespace::ImageModels, ambiguous_images);
        ambiguous.insert(Namespace::Grounding, ambiguous_grounding);

        let catalog = Catalog {
            providers,
            models,
            image_models,
            grounding,
            ambiguous,
        };

        let stats = catalog.stats();
        tracing::info!(
            providers = stats.providers,
            models = stats.models,
            image_models = stats.image_models,
            grounding_prefixes = stats.grounding_prefixes,
            ambiguous = stats.ambiguous_names,
            "pricing catalog built"
        );

        Ok(catalog)
    }
}

/// Index one namespace across providers visited in ascending id order.
///
/// Every qualified key is bound before any bare key, and a bare key keeps its
/// first owner, so repeated builds from the same records agree.
fn index_namespace<T: Clone>(
    namespace: Namespace,
    providers: &BTreeMap<String, ProviderEntry>,
    select: impl Fn(&ProviderEntry) -> &BTreeMap<String, T>,
) -> (NamespaceIndex<T>, Vec<AmbiguousName>) {
    let mut index = NamespaceIndex::default();

    for (provider_id, entry) in providers {
        for (name, pricing) in select(entry) {
            let idx = index.push(provider_id, name, pricing.clone());
            index.bind(qualified_key(provider_id, name), idx);
        }
    }

    let mut contested: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for idx in 0..index.len() {
        let (provider, name) = {
            let entry = index.entry(idx);
            (entry.provider.clone(), entry.name.clone())
        };
        let Some(owner) = index.bind(name.clone(), idx) else {
            continue;
        };

        let owner = index.entry(owner);
        if qualified_key(&owner.provider, &owner.name) == name {
            tracing::debug!(
                namespace = namespace.as_str(),
                key = %name,
                provider = %provider,
                "bare key shadowed by qualified key"
            );
            continue;
        }

        contested
            .entry(name)
            .or_insert_with(|| vec![owner.provider.clone()])
            .push(provider);
    }

    index.finish();

    let ambiguous: Vec<AmbiguousName> = contested
        .into_iter()
        .map(|(name, providers)| {
            let resolved_to = providers[0].clone();
            tracing::warn!(
                namespace = namespace.as_str(),
                name = %name,
                providers = ?providers,
                resolved_to = %resolved_to,
                "ambiguous bare identifier; use a provider-qualified key to disambiguate"
            );
            AmbiguousName {
                name,
                providers,
                resolved_to,
            }
        })
        .collect();

    (index, ambiguous)
}
