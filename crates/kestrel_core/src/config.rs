//! # Pool Configuration
//!
//! Capacities and pre-warm counts, loaded once at startup from TOML:
//!
//! ```toml
//! [pools.particle]
//! max_count = 64
//! prewarm = 16
//!
//! [pools.packet]
//! prewarm = 8        # unbounded, but start with 8 idle packets
//! ```
//!
//! Section names are chosen by the application and bound to a type with
//! [`ObjectPool::configure`](crate::ObjectPool::configure).

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Settings for one pooled type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSettings {
    /// Free-list capacity. Absent = unbounded, 0 = pooling disabled.
    #[serde(default)]
    pub max_count: Option<usize>,
    /// Instances to construct up front.
    #[serde(default)]
    pub prewarm: usize,
}

/// Pool settings keyed by section name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// `[pools.<name>]` sections.
    #[serde(default)]
    pub pools: BTreeMap<String, PoolSettings>,
}

impl PoolConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] when a section asks to pre-warm more
    /// instances than its capacity allows.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// same errors as [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), pools = config.pools.len(), "loaded pool config");
        Ok(config)
    }

    /// Returns the settings of section `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PoolSettings> {
        self.pools.get(name)
    }

    /// Checks every section for consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for the first section whose
    /// `prewarm` exceeds its `max_count`.
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, settings) in &self.pools {
            if let Some(max) = settings.max_count {
                if settings.prewarm > max {
                    return Err(ConfigError::Invalid {
                        pool: name.clone(),
                        reason: format!("prewarm {} exceeds max_count {max}", settings.prewarm),
                    });
                }
            }
        }
        Ok(())
    }
}
