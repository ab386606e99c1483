//! Connection settings dictionaries.

use std::collections::HashMap;

use zbus::zvariant::{self, OwnedValue, Value};

/// Key/value pairs of one setting group, such as `802-11-wireless`.
pub type SettingGroup = HashMap<String, OwnedValue>;

/// Settings of a connection profile, keyed by setting group name.
///
/// This is the `a{sa{sv}}` dictionary NetworkManager exchanges for both
/// settings and secrets. Values are opaque to the registry.
pub type SettingsMap = HashMap<String, SettingGroup>;

/// Deep-copies a settings dictionary.
///
/// # Errors
///
/// Returns `zvariant::Error` if a value cannot be duplicated (file
/// descriptors whose `dup` fails).
pub fn clone_settings(settings: &SettingsMap) -> zvariant::Result<SettingsMap> {
    settings
        .iter()
        .map(|(group, entries)| {
            let entries = entries
                .iter()
                .map(|(key, value)| Ok((key.clone(), value.try_clone()?)))
                .collect::<zvariant::Result<SettingGroup>>()?;
            Ok((group.clone(), entries))
        })
        .collect()
}

/// Converts a plain value into an owned setting value.
///
/// # Errors
///
/// Returns `zvariant::Error` if the value cannot be owned.
pub fn setting_value<'a>(value: impl Into<Value<'a>>) -> zvariant::Result<OwnedValue> {
    value.into().try_to_owned()
}
