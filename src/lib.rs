//! nm-user-settings - NetworkManager user settings service.
//!
//! Publishes wireless connection profiles to NetworkManager over D-Bus and
//! brokers secrets requests between NetworkManager and whoever supplies
//! credentials, typically a desktop shell prompting the user.
//!
//! - A [`Registry`](services::network_settings::Registry) holds the profiles
//!   and relays every secrets request to its subscribers
//! - Each profile answers `GetSettings` directly and `GetSecrets` either from
//!   cached secrets or through a deferred reply
//! - A [`SettingsDirectory`](services::network_settings::SettingsDirectory)
//!   mints object paths and exports new profiles
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use nm_user_settings::services::network_settings::{SecretsError, SettingsDirectory, SettingsMap};
//! use futures::StreamExt;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let directory = SettingsDirectory::default();
//! let mut requests = directory.get_settings().secrets_requests();
//!
//! directory.add_connection("home-net", SettingsMap::new(), None).await?;
//!
//! while let Some(request) = requests.next().await {
//!     request.error(SecretsError::Canceled);
//! }
//! # Ok(())
//! # }
//! ```

/// Configuration schema definitions and validation.
pub mod config;

/// Core error types and result aliases.
pub mod core;

/// Services answering NetworkManager.
pub mod services;

/// Logging setup.
pub mod tracing_config;

/// Re-exported core types for convenience.
pub use core::{Result, UserSettingsError};
