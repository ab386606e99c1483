//! nm-user-settings daemon - Publishes connection profiles to NetworkManager
//!
//! Claims the user settings name on the bus, exports the settings object and
//! answers secrets requests until interrupted. Without a secrets provider
//! attached, every deferred request is failed with `NoProvider` so
//! NetworkManager is never left waiting.

use std::{error::Error, path::PathBuf};

use clap::Parser;
use futures::StreamExt;
use nm_user_settings::{
    config::{BusType, Config, ConfigPaths},
    services::network_settings::{self, SecretsError, SettingsDirectory},
    tracing_config,
};
use tracing::{Level, info, instrument, span, warn};

#[derive(Parser)]
#[command(name = "nm-user-settings")]
#[command(about = "NetworkManager user settings service")]
struct Cli {
    /// Configuration file to load instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use the session bus instead of the configured one
    #[arg(long)]
    session: bool,

    /// Also write logs to the state directory
    #[arg(long)]
    log_file: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => ConfigPaths::main_config()?,
    };
    let mut config = Config::load(&config_path)?;
    if cli.session {
        config.bus.bus = BusType::Session;
    }

    if cli.log_file {
        tracing_config::init_with_file(config.general.log_level)?;
    } else {
        tracing_config::init(config.general.log_level)?;
    }

    let _span = span!(Level::INFO, "nm_user_settings").entered();
    info!(config = %config_path.display(), "Starting NetworkManager user settings service");

    let directory = bootstrap(&config).await?;
    spawn_default_provider(&directory);

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    Ok(())
}

/// Connects to the bus and exports the settings object.
///
/// # Errors
/// Returns error if the bus is unreachable, the service name is taken or the
/// settings object cannot be exported.
#[instrument(skip_all)]
async fn bootstrap(config: &Config) -> nm_user_settings::Result<SettingsDirectory> {
    let conn = network_settings::connect(&config.bus).await?;
    let directory = SettingsDirectory::serve(conn, config).await?;

    let loaded = directory.load_connections();
    info!(loaded, path = %config.bus.settings_path, "Settings service ready");

    Ok(directory)
}

/// Answers every secrets request with `NoProvider`.
fn spawn_default_provider(directory: &SettingsDirectory) {
    let mut requests = directory.get_settings().secrets_requests();

    tokio::spawn(async move {
        while let Some(request) = requests.next().await {
            warn!(
                ssid = request.connection.ssid(),
                path = %request.connection.path(),
                setting = %request.request.setting_name,
                "No secrets provider attached, refusing request"
            );
            request.error(SecretsError::NoProvider);
        }
    });
}
