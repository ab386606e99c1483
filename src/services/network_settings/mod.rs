/// Connection profiles and their bus objects
mod connection;
/// Directory minting connection paths
mod directory;
/// Network settings service errors
mod error;
/// Registry of connection profiles
mod registry;
/// Secrets request continuations
mod secrets;
/// Bus connection and object export
mod server;
/// Event channel
mod signal;
/// Type definitions for settings maps, constants, and NetworkManager enums.
mod types;

pub use connection::{
    ConnectionInterface, ConnectionSecretsInterface, SecretsDelivery, SecretsState,
    SettingsConnection,
};
pub use directory::SettingsDirectory;
pub use error::{NetworkSettingsError, SecretsError};
pub use registry::{Registry, SettingsInterface};
pub use secrets::{ConnectionSecretsRequest, PendingSecrets, SecretsRequest, SecretsResponder};
pub use server::{BusExporter, connect};
pub use signal::{Signal, SignalStream, SubscriptionId};
pub use types::*;
