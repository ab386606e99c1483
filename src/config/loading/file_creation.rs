use crate::config::Config;
use crate::{Result, UserSettingsError};
use std::{fs, path::Path};

/// Creates a configuration file holding `config`
pub fn create_default_config_file(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| UserSettingsError::IoError {
            path: parent.to_path_buf(),
            details: format!("Failed to create config directory: {e}"),
        })?;
    }

    let body = toml::to_string_pretty(config).map_err(|e| UserSettingsError::ConfigValidation {
        component: "defaults".to_string(),
        details: e.to_string(),
    })?;

    fs::write(path, format!("# nm-user-settings configuration file\n{body}")).map_err(|e| {
        UserSettingsError::IoError {
            path: path.to_path_buf(),
            details: format!("Failed to create config file: {e}"),
        }
    })?;

    Ok(())
}
