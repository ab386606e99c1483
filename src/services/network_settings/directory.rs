use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tracing::{debug, instrument, warn};
use zbus::zvariant::OwnedObjectPath;

use super::{
    NM_SETTINGS_PATH, NetworkSettingsError, SettingsMap, connection::SettingsConnection,
    registry::Registry, server::BusExporter,
};
use crate::config::Config;

/// Entry point for creating and looking up connection profiles.
///
/// Owns the one [`Registry`] of the process and the counter that mints
/// connection object paths. Paths have the form `<base_path>/<n>` with `n`
/// counting up from zero; a path is never handed out twice.
#[derive(Debug)]
pub struct SettingsDirectory {
    registry: Arc<Registry>,
    base_path: String,
    counter: AtomicU64,
    exporter: Option<BusExporter>,
}

impl SettingsDirectory {
    /// Creates an in-process directory publishing paths below `base_path`.
    ///
    /// Nothing is exported on a bus.
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            registry: Arc::new(Registry::new()),
            base_path: base_path.into(),
            counter: AtomicU64::new(0),
            exporter: None,
        }
    }

    /// Creates a directory whose registry and connections are exported on `conn`.
    ///
    /// # Errors
    ///
    /// Returns `NetworkSettingsError::DbusError` if the registry object cannot be exported.
    #[instrument(skip_all, fields(path = %config.bus.settings_path))]
    pub async fn serve(conn: zbus::Connection, config: &Config) -> Result<Self, NetworkSettingsError> {
        let exporter = BusExporter::new(
            conn,
            config.bus.settings_path.clone(),
            config.secrets.request_timeout(),
        );
        let directory = Self {
            exporter: Some(exporter.clone()),
            ..Self::new(config.bus.settings_path.clone())
        };

        exporter.export_registry(&directory.registry).await?;
        debug!("settings object exported");

        Ok(directory)
    }

    /// The registry all connections are added to.
    pub fn get_settings(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// The connection registered under `ssid`, if any.
    pub fn find_connection(&self, ssid: &str) -> Option<Arc<SettingsConnection>> {
        self.registry.find(ssid)
    }

    /// Loads stored connection profiles.
    ///
    /// Profiles are not persisted, so nothing is loaded. Returns the number
    /// of profiles added.
    pub fn load_connections(&self) -> usize {
        debug!("no connection store configured, nothing to load");
        0
    }

    /// Creates a connection under a fresh path and registers it under `ssid`.
    ///
    /// When serving on a bus the connection objects are exported before
    /// registration and `NewConnection` is emitted after it. The objects of
    /// a connection replaced under the same `ssid` are withdrawn.
    ///
    /// # Errors
    ///
    /// Returns `NetworkSettingsError::InvalidObjectPath` if the base path
    /// does not form a valid object path, or `NetworkSettingsError::DbusError`
    /// if exporting fails.
    pub async fn add_connection(
        &self,
        ssid: &str,
        settings: SettingsMap,
        secrets: Option<SettingsMap>,
    ) -> Result<Arc<SettingsConnection>, NetworkSettingsError> {
        let path = self.next_path()?;
        let connection = SettingsConnection::new(ssid, path, settings, secrets);

        if let Some(exporter) = &self.exporter {
            exporter.export_connection(&connection).await?;
        }

        let replaced = self.registry.add_connection(ssid, Arc::clone(&connection));

        if let Some(exporter) = &self.exporter {
            let withdrawn = match &replaced {
                Some(previous) => exporter.withdraw_connection(previous).await,
                None => Ok(()),
            };
            if let Err(err) = withdrawn {
                warn!(ssid, error = %err, "failed to withdraw replaced connection");
            }
            if let Err(err) = exporter.announce(connection.path()).await {
                warn!(path = %connection.path(), error = %err, "failed to emit NewConnection");
            }
        }

        Ok(connection)
    }

    fn next_path(&self) -> Result<OwnedObjectPath, NetworkSettingsError> {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let path = format!("{}/{n}", self.base_path);

        OwnedObjectPath::try_from(path.clone()).map_err(|err| {
            NetworkSettingsError::InvalidObjectPath {
                path,
                reason: err.to_string(),
            }
        })
    }
}

impl Default for SettingsDirectory {
    fn default() -> Self {
        Self::new(NM_SETTINGS_PATH)
    }
}
