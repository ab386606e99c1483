//! Configuration schema definitions.
//!
//! Defines the configuration structure for the settings daemon: logging,
//! bus placement of the exported objects and secrets request handling.
//! All configurations are serializable to/from TOML format.

mod bus;
mod general;
mod loading;
mod paths;
mod secrets;

#[cfg(test)]
mod tests;

pub use bus::{BusConfig, BusType};
pub use general::{GeneralConfig, LogLevel};
pub use paths::ConfigPaths;
pub use secrets::SecretsConfig;

use serde::{Deserialize, Serialize};

/// Main configuration structure for the settings daemon.
///
/// Represents the complete configuration schema that can be loaded
/// from TOML files. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// General application settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Where the settings objects are published.
    #[serde(default)]
    pub bus: BusConfig,

    /// Secrets request handling.
    #[serde(default)]
    pub secrets: SecretsConfig,
}
