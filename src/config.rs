//! Buffer pool configuration.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse pool config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("initial_capacity must be positive")]
    ZeroInitialCapacity,
    #[error("initial_capacity {initial} exceeds max_buffer_capacity {max}")]
    InitialExceedsMax { initial: usize, max: usize },
}

/// Sizing for `BufferPool` and the writers it hands out.
///
/// Every field is optional in TOML; missing ones take the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    /// Capacity of a writer created without an explicit one.
    pub initial_capacity: usize,
    /// Free buffers kept per storage kind (bytes, chars).
    pub max_retained: usize,
    /// Returned buffers larger than this are dropped instead of kept.
    pub max_buffer_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 4 * 1024,
            max_retained: 64,
            max_buffer_capacity: 4 * 1024 * 1024,
        }
    }
}

impl PoolConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: PoolConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_capacity == 0 {
            return Err(ConfigError::ZeroInitialCapacity);
        }
        if self.initial_capacity > self.max_buffer_capacity {
            return Err(ConfigError::InitialExceedsMax {
                initial: self.initial_capacity,
                max: self.max_buffer_capacity,
            });
        }
        Ok(())
    }
}
