mod file_creation;

use super::Config;
use crate::{Result, UserSettingsError};
use file_creation::create_default_config_file;
use std::{fs, path::Path};
use tracing::debug;

impl Config {
    /// Loads the configuration file at `path`.
    ///
    /// A missing file is created with the default configuration written
    /// out, so the user has something to edit.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The default file cannot be created
    /// - The configuration file cannot be read
    /// - The TOML content is invalid or does not match the schema
    pub fn load(path: &Path) -> Result<Config> {
        if !path.exists() {
            debug!(path = %path.display(), "config file missing, writing defaults");
            create_default_config_file(path, &Config::default())?;
        }

        let content = fs::read_to_string(path).map_err(|e| UserSettingsError::IoError {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;

        Self::from_toml(&content).map_err(|e| match e {
            UserSettingsError::TomlParseError { details, .. } => {
                UserSettingsError::toml_parse(details, Some(path))
            }
            other => other,
        })
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `UserSettingsError::TomlParseError` if the text is not valid TOML
    /// or `UserSettingsError::ConfigValidation` if a value is out of range.
    pub fn from_toml(content: &str) -> Result<Config> {
        let config: Config =
            toml::from_str(content).map_err(|e| UserSettingsError::toml_parse(e, None))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !self.bus.settings_path.starts_with('/') || self.bus.settings_path.ends_with('/') {
            return Err(UserSettingsError::ConfigValidation {
                component: "bus".to_string(),
                details: format!(
                    "settings_path '{}' must be an absolute object path without a trailing '/'",
                    self.bus.settings_path
                ),
            });
        }

        if self.bus.service_name.is_empty() {
            return Err(UserSettingsError::ConfigValidation {
                component: "bus".to_string(),
                details: "service_name must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
