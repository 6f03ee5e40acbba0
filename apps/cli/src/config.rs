//! Layered configuration: defaults → TOML file → `NEBULA_REGION_*` env → flags

use std::path::Path;

use anyhow::{Context, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use nebula_region::PoolConfig;
use serde::{Deserialize, Serialize};

/// Environment prefix; nested keys use `__`, e.g. `NEBULA_REGION_POOL__BLOCK_SIZE`
pub const ENV_PREFIX: &str = "NEBULA_REGION_";

/// Everything the CLI can be configured with
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub pool: PoolConfig,
    pub workload: WorkloadConfig,
}

/// Synthetic per-round workload for `run`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    pub rounds: usize,
    pub small: usize,
    pub small_size: usize,
    pub large: usize,
    pub large_size: usize,
    pub cleanups: usize,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            rounds: 3,
            small: 1000,
            small_size: 48,
            large: 8,
            large_size: 16 * 1024,
            cleanups: 4,
        }
    }
}

impl CliConfig {
    /// Loads defaults, then `file` if given, then the environment
    pub fn load(file: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = file {
            if !path.exists() {
                bail!("configuration file not found: {}", path.display());
            }
            figment = figment.merge(Toml::file(path));
        }

        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("failed to load configuration")?;

        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Rejects a pool configuration the library would refuse
    pub fn validate(&self) -> anyhow::Result<()> {
        self.pool.validate().context("invalid pool configuration")?;
        Ok(())
    }
}
