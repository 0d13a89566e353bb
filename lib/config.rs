//! Backend configuration.
//!
//! Settings are merged from (highest precedence first):
//! 1. Environment variables prefixed with `STIM_BACKEND_`, e.g.
//!    `STIM_BACKEND_SEED=1234`
//! 2. An optional TOML file
//! 3. Default values

use std::path::Path;
use figment::{
    providers::{ Env, Format, Serialized, Toml },
    Figment,
};
use serde::{ Deserialize, Serialize };
use crate::{
    error::{ Error, Result },
    stim::DEFAULT_PARALLEL_THRESHOLD,
};

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "STIM_BACKEND_";

/// Settings for a [`StimBackend`][crate::stim_backend::StimBackend].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Master seed for all sampling. Drawn from system entropy if unset.
    pub seed: Option<u64>,
    /// Sample shots on the rayon thread pool.
    pub parallel: bool,
    /// Minimum number of shots in a batch before sampling goes parallel.
    pub parallel_threshold: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            seed: None,
            parallel: true,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl BackendConfig {
    /// Default configuration with a fixed seed.
    pub fn seeded(seed: u64) -> Self { Self { seed: Some(seed), ..Self::default() } }

    /// Load from defaults and the environment only.
    pub fn load() -> Result<Self> { Self::load_from(None) }

    /// Load from defaults, a TOML file (if given), and the environment.
    ///
    /// # Errors
    /// Fails if `path` is given but does not exist, or if any source is
    /// malformed.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            if !path.is_file() {
                return Err(Error::ConfigLoad(Box::new(figment::Error::from(
                    format!("config file {} not found", path.display())
                ))));
            }
            figment = figment.merge(Toml::file(path));
        }
        let config: Self = figment.merge(Env::prefixed(ENV_PREFIX)).extract()?;
        Ok(config)
    }
}
