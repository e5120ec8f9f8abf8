//! Byte sources that supply raw provider documents.

use std::path::{Path, PathBuf};

use super::{ConfigError, ConfigResult};

/// A named, undecoded provider document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl RawDocument {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Supplies provider documents to the catalog builder.
pub trait ConfigSource: Send + Sync {
    /// Source name for logging and error context
    fn name(&self) -> &str;

    /// Read every document the source holds
    fn load(&self) -> ConfigResult<Vec<RawDocument>>;
}

/// Documents held in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    name: String,
    documents: Vec<RawDocument>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self {
            name: "memory".to_string(),
            documents: Vec::new(),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: Vec::new(),
        }
    }

    pub fn document(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.documents.push(RawDocument::new(name, bytes));
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl ConfigSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> ConfigResult<Vec<RawDocument>> {
        Ok(self.documents.clone())
    }
}

/// Documents compiled into the binary, e.g. with `include_str!`.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedSource {
    documents: &'static [(&'static str, &'static str)],
}

impl EmbeddedSource {
    pub const fn new(documents: &'static [(&'static str, &'static str)]) -> Self {
        Self { documents }
    }
}

impl ConfigSource for EmbeddedSource {
    fn name(&self) -> &str {
        "embedded"
    }

    fn load(&self) -> ConfigResult<Vec<RawDocument>> {
        Ok(self
            .documents
            .iter()
            .map(|(name, contents)| RawDocument::new(*name, contents.as_bytes()))
            .collect())
    }
}

const DOCUMENT_PATTERNS: [&str; 3] = ["*.json", "*.yaml", "*.yml"];

/// Every JSON or YAML document directly inside a directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    name: String,
}

impl DirectorySource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            name: root.display().to_string(),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn source_error(&self, message: impl Into<String>) -> ConfigError {
        ConfigError::Source {
            name: self.name.clone(),
            message: message.into(),
        }
    }

    fn paths(&self) -> ConfigResult<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(self.source_error("not a directory"));
        }

        let mut paths = Vec::new();
        for pattern in DOCUMENT_PATTERNS {
            let full = self.root.join(pattern);
            let full = full
                .to_str()
                .ok_or_else(|| self.source_error("path is not valid UTF-8"))?;
            let entries = glob::glob(full).map_err(|e| self.source_error(e.to_string()))?;
            for entry in entries {
                let path = entry.map_err(|e| self.source_error(e.to_string()))?;
                if path.is_file() {
                    paths.push(path);
                }
            }
        }
        paths.sort();
        Ok(paths)
    }
}

impl ConfigSource for DirectorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> ConfigResult<Vec<RawDocument>> {
        let mut documents = Vec::new();
        for path in self.paths()? {
            let bytes = std::fs::read(&path)?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            documents.push(RawDocument { name, bytes });
        }
        tracing::debug!(
            source = %self.name,
            documents = documents.len(),
            "loaded pricing documents"
        );
        Ok(documents)
    }
}
