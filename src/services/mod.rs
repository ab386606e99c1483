/// Shared reactive primitives
pub mod common;
/// User settings service answering NetworkManager over D-Bus
pub mod network_settings;

pub use network_settings::{Registry, SettingsConnection, SettingsDirectory};
