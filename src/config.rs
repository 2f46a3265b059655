//! Layered configuration for bulk calls.
//!
//! Values resolve from compiled defaults, then an optional `.plcrpc.toml`
//! in the working directory, then `PLCRPC_`-prefixed environment variables.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "PLCRPC_";
/// Configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".plcrpc.toml";
/// Default maximum chunk size: 64 KiB.
pub const DEFAULT_MAX_CHUNK_BYTES: usize = 64 * 1024;
/// Default JSON-RPC endpoint path on the PLC web server.
pub const DEFAULT_ENDPOINT: &str = "/api/jsonrpc";

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A provider failed or a value had the wrong type.
    #[error("failed to load configuration: {0}")]
    Figment(#[from] Box<figment::Error>),
    /// The chunk budget was zero.
    #[error("max_chunk_bytes must be greater than zero")]
    InvalidMaxChunkBytes,
}

/// Settings for a [`BulkClient`](crate::client::BulkClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkConfig {
    /// Largest chunk the server accepts, in bytes.
    pub max_chunk_bytes: usize,
    /// Path chunks are posted to.
    pub endpoint: String,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            max_chunk_bytes: DEFAULT_MAX_CHUNK_BYTES,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
        }
    }
}

impl BulkConfig {
    /// The provider stack used by [`Self::load`].
    #[must_use]
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Resolve configuration from the default provider stack.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a provider fails or validation rejects the
    /// result.
    pub fn load() -> Result<Self, ConfigError> { Self::from_figment(&Self::figment()) }

    /// Extract and validate configuration from `figment`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if extraction or validation fails.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that cannot pack anything.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidMaxChunkBytes`] for a zero budget.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_chunk_bytes == 0 {
            return Err(ConfigError::InvalidMaxChunkBytes);
        }
        Ok(())
    }
}
