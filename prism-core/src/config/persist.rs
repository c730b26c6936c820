//! Binary configuration storage
//!
//! Configurations are stored as a postcard-encoded `(version, config)`
//! pair so stale data from an older layout is rejected instead of
//! misread.

use alloc::vec::Vec;

use super::types::DisplayConfig;
use crate::error::ConfigError;

/// Layout version written by [`encode`]
pub const CONFIG_VERSION: u8 = 1;

/// Serialize a configuration for storage
pub fn encode(config: &DisplayConfig) -> Result<Vec<u8>, ConfigError> {
    postcard::to_allocvec(&(CONFIG_VERSION, config)).map_err(|_| ConfigError::Encoding)
}

/// Deserialize and validate a stored configuration
pub fn decode(bytes: &[u8]) -> Result<DisplayConfig, ConfigError> {
    let (version, config): (u8, DisplayConfig) =
        postcard::from_bytes(bytes).map_err(|_| ConfigError::Encoding)?;
    if version != CONFIG_VERSION {
        warn!("stored config version {} != {}", version, CONFIG_VERSION);
        return Err(ConfigError::VersionMismatch);
    }
    config.validate()?;
    debug!("config decoded, {} bytes", bytes.len());
    Ok(config)
}
