//! # Core Error Types
//!
//! Errors raised by the object pool and by pool configuration loading.

use crate::identity::Identity;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while recycling pooled objects.
///
/// These are programmer errors: they surface misuse during development and
/// are not expected to be recovered from at runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The same entity was recycled twice without being taken out in between.
    #[error("{type_name} {identity} is already in its free list")]
    DuplicateRecycle {
        /// Type whose free list already holds the entity.
        type_name: &'static str,
        /// Identity of the entity.
        identity: Identity,
    },
}

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;

/// Errors that can occur while loading pool configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read pool config {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML or does not match the schema.
    #[error("failed to parse pool config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config parsed but describes an impossible pool.
    #[error("invalid settings for pool `{pool}`: {reason}")]
    Invalid {
        /// Name of the offending pool section.
        pool: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
