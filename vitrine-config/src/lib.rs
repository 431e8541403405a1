//! Configuration loading for Vitrine.
//!
//! Settings are composed from three layers, later ones winning: built-in
//! defaults, an optional TOML file, and the process environment (optionally
//! seeded from a `.env` file).

#![allow(missing_docs)]

pub mod loader;
pub mod models;
pub mod util;

pub use loader::{ConfigLoad, ConfigLoader, error::ConfigLoadError};
pub use models::validation::{ConfigWarning, ConfigWarnings};
pub use models::{
    Config, ConfigMetadata, CorsConfig, DatabaseConfig, ListingConfig,
    RedisConfig, ServerConfig,
};
