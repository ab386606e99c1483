//! Bus names, object paths and interface names of the user settings service.

/// Well-known bus name NetworkManager looks up for user connection settings.
pub const SETTINGS_SERVICE: &str = "org.freedesktop.NetworkManagerUserSettings";

/// Object path of the settings registry. Connections live below it.
pub const NM_SETTINGS_PATH: &str = "/org/freedesktop/NetworkManagerSettings";

/// Interface exported by the settings registry.
pub const NM_SETTINGS_IFACE: &str = "org.freedesktop.NetworkManagerSettings";

/// Interface exported by each connection profile.
pub const NM_CONNECTION_IFACE: &str = "org.freedesktop.NetworkManagerSettings.Connection";

/// Secrets interface exported by each connection profile.
pub const NM_SECRETS_IFACE: &str = "org.freedesktop.NetworkManagerSettings.Connection.Secrets";
