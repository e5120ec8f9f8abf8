//! Exact and boundary-safe prefix resolution over one namespace.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde::{Deserialize, Serialize};

/// Characters that may follow a matched prefix.
pub const SEPARATORS: [char; 3] = ['-', '.', '/'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Prefix,
}

/// True when `key` is `query` itself or a prefix of it that ends right
/// before a separator, so `gpt-4` matches `gpt-4-turbo` but not `gpt-45`.
pub fn is_boundary_prefix(query: &str, key: &str) -> bool {
    match query.strip_prefix(key) {
        Some("") => true,
        Some(rest) => rest.starts_with(SEPARATORS),
        None => false,
    }
}

#[derive(Debug, Clone)]
pub(crate) struct IndexEntry<T> {
    pub provider: String,
    pub name: String,
    pub pricing: T,
}

#[derive(Debug, Clone)]
pub(crate) struct Resolved<'a, T> {
    pub entry: &'a IndexEntry<T>,
    pub matched_key: &'a str,
    pub kind: MatchKind,
}

/// Keys bound to entries, plus the candidate list for prefix scans ordered
/// longest first (ties broken lexicographically).
#[derive(Debug, Clone)]
pub(crate) struct NamespaceIndex<T> {
    entries: Vec<IndexEntry<T>>,
    exact: HashMap<String, usize>,
    candidates: Vec<(String, usize)>,
}

impl<T> Default for NamespaceIndex<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            exact: HashMap::new(),
            candidates: Vec::new(),
        }
    }
}

impl<T> NamespaceIndex<T> {
    pub fn push(&mut self, provider: &str, name: &str, pricing: T) -> usize {
        self.entries.push(IndexEntry {
            provider: provider.to_string(),
            name: name.to_string(),
            pricing,
        });
        self.entries.len() - 1
    }

    /// Bind `key` to entry `idx` unless already bound; returns the existing
    /// owner when the key was taken.
    pub fn bind(&mut self, key: String, idx: usize) -> Option<usize> {
        match self.exact.entry(key) {
            Entry::Occupied(existing) => Some(*existing.get()),
            Entry::Vacant(slot) => {
                slot.insert(idx);
                None
            }
        }
    }

    pub fn finish(&mut self) {
        let mut candidates: Vec<(String, usize)> = self
            .exact
            .iter()
            .map(|(key, idx)| (key.clone(), *idx))
            .collect();
        candidates.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        self.candidates = candidates;
    }

    pub fn entry(&self, idx: usize) -> &IndexEntry<T> {
        &self.entries[idx]
    }

    pub fn entries(&self) -> &[IndexEntry<T>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn resolve(&self, query: &str) -> Option<Resolved<'_, T>> {
        if let Some((key, idx)) = self.exact.get_key_value(query) {
            return Some(Resolved {
                entry: &self.entries[*idx],
                matched_key: key,
                kind: MatchKind::Exact,
            });
        }

        self.candidates
            .iter()
            .find(|(key, _)| is_boundary_prefix(query, key))
            .map(|(key, idx)| Resolved {
                entry: &self.entries[*idx],
                matched_key: key,
                kind: MatchKind::Prefix,
            })
    }

    /// Like [`resolve`](Self::resolve), restricted to keys bound to entries
    /// of `provider`.
    pub fn resolve_owned_by(&self, query: &str, provider: &str) -> Option<Resolved<'_, T>> {
        self.candidates
            .iter()
            .find(|(key, idx)| {
                self.entries[*idx].provider == provider && is_boundary_prefix(query, key)
            })
            .map(|(key, idx)| Resolved {
                entry: &self.entries[*idx],
                matched_key: key,
                kind: if key == query {
                    MatchKind::Exact
                } else {
                    MatchKind::Prefix
                },
            })
    }
}
