//! Loading and validating provider pricing configuration.
//!
//! ```rust,no_run
//! use pricebook::config::{DirectorySource, EngineConfig};
//! use pricebook::PricingEngine;
//!
//! # fn example() -> Result<(), pricebook::Error> {
//! let engine = PricingEngine::from_source(
//!     &DirectorySource::new("./pricing"),
//!     EngineConfig::from_env()?,
//! )?;
//! # Ok(())
//! # }
//! ```

pub mod schema;
pub mod settings;
pub mod source;
pub mod validator;

pub use schema::{DocumentFormat, GroundingRecord, ProviderRecord};
pub use settings::{DEFAULT_DECIMAL_PLACES, DEFAULT_MAX_RATE, EngineConfig, MAX_DECIMAL_PLACES};
pub use source::{ConfigSource, DirectorySource, EmbeddedSource, MemorySource, RawDocument};
pub use validator::PricingValidator;

use thiserror::Error;

/// Construction-time configuration failures.
///
/// Any of these aborts catalog construction as a whole.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Document could not be decoded into a provider record
    #[error("Failed to parse {document}: {message}")]
    Parse {
        /// Document (file) name
        document: String,
        /// Decoder message
        message: String,
    },

    /// A field failed validation
    #[error("Invalid value in {document} at {field} ({value}): {message}")]
    InvalidValue {
        /// Document (file) name
        document: String,
        /// Dotted path of the offending field
        field: String,
        /// Offending value as written
        value: String,
        /// What was wrong with it
        message: String,
    },

    /// Two documents declared the same provider id
    #[error("Provider '{provider}' defined twice ({first} and {second})")]
    DuplicateProvider {
        provider: String,
        first: String,
        second: String,
    },

    /// A byte source could not produce its documents
    #[error("Source '{name}' failed: {message}")]
    Source { name: String, message: String },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment override could not be used
    #[error("Invalid environment variable {key}: {message}")]
    Env { key: String, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(
        document: &str,
        field: impl Into<String>,
        value: impl ToString,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            document: document.to_string(),
            field: field.into(),
            value: value.to_string(),
            message: message.into(),
        }
    }

    /// Document the error was raised for, when it concerns one.
    pub fn document(&self) -> Option<&str> {
        match self {
            Self::Parse { document, .. } | Self::InvalidValue { document, .. } => Some(document),
            Self::DuplicateProvider { second, .. } => Some(second),
            _ => None,
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
