//! Optional process-wide engine.
//!
//! Libraries should pass a [`PricingEngine`] explicitly. Binaries that want a
//! single shared instance install one here at startup and fail fast if that
//! does not work.

use std::path::PathBuf;
use std::sync::OnceLock;

use crate::config::{DirectorySource, EngineConfig};
use crate::{Error, PricingEngine, Result};

/// Directory `init_from_env` loads provider documents from.
pub const ENV_CONFIG_DIR: &str = "PRICEBOOK_CONFIG_DIR";

static ENGINE: OnceLock<PricingEngine> = OnceLock::new();

/// Install `engine` as the shared instance.
pub fn init(engine: PricingEngine) -> Result<&'static PricingEngine> {
    let mut fresh = false;
    let installed = ENGINE.get_or_init(|| {
        fresh = true;
        engine
    });
    if !fresh {
        return Err(Error::AlreadyInitialized);
    }
    tracing::info!(providers = installed.stats().providers, "global pricing engine installed");
    Ok(installed)
}

/// Build the shared instance with `build`; on error the slot stays empty.
pub fn init_with<F>(build: F) -> Result<&'static PricingEngine>
where
    F: FnOnce() -> Result<PricingEngine>,
{
    if ENGINE.get().is_some() {
        return Err(Error::AlreadyInitialized);
    }
    init(build()?)
}

/// Load every document in `$PRICEBOOK_CONFIG_DIR` with settings from the
/// environment.
pub fn init_from_env() -> Result<&'static PricingEngine> {
    init_with(|| {
        let dir = std::env::var(ENV_CONFIG_DIR).map_err(|e| {
            Error::Config(crate::config::ConfigError::Env {
                key: ENV_CONFIG_DIR.to_string(),
                message: e.to_string(),
            })
        })?;
        let source = DirectorySource::new(PathBuf::from(dir));
        Ok(PricingEngine::from_source(&source, EngineConfig::from_env()?)?)
    })
}

pub fn get() -> Option<&'static PricingEngine> {
    ENGINE.get()
}

pub fn engine() -> Result<&'static PricingEngine> {
    ENGINE.get().ok_or(Error::NotInitialized)
}
