//! Configuration types
//!
//! Panel geometry and bus parameters, loadable from TOML text and stored
//! as postcard binary data.

#[cfg(feature = "serde")]
pub mod persist;
#[cfg(feature = "serde")]
pub mod toml;
pub mod types;

#[cfg(feature = "serde")]
pub use self::persist::{decode, encode, CONFIG_VERSION};
#[cfg(feature = "serde")]
pub use self::toml::parse_toml;
pub use types::*;
