use serde::{Deserialize, Serialize};

use crate::services::network_settings::{NM_SETTINGS_PATH, SETTINGS_SERVICE};

/// Which message bus the settings objects are exported on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BusType {
    /// The system bus, where NetworkManager looks for user settings.
    #[default]
    System,

    /// The session bus, useful for development without privileges.
    Session,
}

/// Placement of the exported settings objects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusConfig {
    /// Bus to connect to.
    #[serde(default)]
    pub bus: BusType,

    /// Well-known name requested on the bus.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Object path of the registry. Connections are published below it.
    #[serde(default = "default_settings_path")]
    pub settings_path: String,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            bus: BusType::default(),
            service_name: default_service_name(),
            settings_path: default_settings_path(),
        }
    }
}

fn default_service_name() -> String {
    SETTINGS_SERVICE.to_string()
}

fn default_settings_path() -> String {
    NM_SETTINGS_PATH.to_string()
}
