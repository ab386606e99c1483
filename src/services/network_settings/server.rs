use std::{sync::Arc, time::Duration};

use tracing::{debug, info, instrument, warn};
use zbus::{Connection, object_server::SignalEmitter, zvariant::OwnedObjectPath};

use super::{
    NetworkSettingsError,
    connection::{ConnectionInterface, ConnectionSecretsInterface, SettingsConnection},
    registry::{Registry, SettingsInterface},
};
use crate::config::{BusConfig, BusType};

/// Opens the configured bus and claims the service name.
///
/// # Errors
///
/// Returns `NetworkSettingsError::ServiceInitializationFailed` if the bus is
/// unreachable or the name is already owned.
#[instrument(skip(bus), fields(bus = ?bus.bus, name = %bus.service_name))]
pub async fn connect(bus: &BusConfig) -> Result<Connection, NetworkSettingsError> {
    let conn = match bus.bus {
        BusType::System => Connection::system().await,
        BusType::Session => Connection::session().await,
    }
    .map_err(|e| {
        NetworkSettingsError::ServiceInitializationFailed(format!(
            "cannot connect to the {:?} bus: {e}",
            bus.bus
        ))
    })?;

    conn.request_name(bus.service_name.as_str())
        .await
        .map_err(|e| {
            NetworkSettingsError::ServiceInitializationFailed(format!(
                "cannot claim {}: {e}",
                bus.service_name
            ))
        })?;

    info!("claimed bus name");
    Ok(conn)
}

/// Publishes the registry and its connections on a bus connection.
#[derive(Debug, Clone)]
pub struct BusExporter {
    conn: Connection,
    settings_path: String,
    secrets_timeout: Option<Duration>,
}

impl BusExporter {
    /// Exports objects on `conn`, with the registry at `settings_path`.
    pub fn new(
        conn: Connection,
        settings_path: impl Into<String>,
        secrets_timeout: Option<Duration>,
    ) -> Self {
        Self {
            conn,
            settings_path: settings_path.into(),
            secrets_timeout,
        }
    }

    /// Exports the registry object.
    ///
    /// # Errors
    ///
    /// Returns `NetworkSettingsError::DbusError` if the object server rejects the path.
    pub async fn export_registry(&self, registry: &Arc<Registry>) -> Result<(), NetworkSettingsError> {
        let added = self
            .conn
            .object_server()
            .at(
                self.settings_path.as_str(),
                SettingsInterface::new(Arc::clone(registry)),
            )
            .await?;

        if !added {
            warn!(path = %self.settings_path, "settings object already exported");
        }
        Ok(())
    }

    /// Exports the settings and secrets objects of one connection.
    ///
    /// # Errors
    ///
    /// Returns `NetworkSettingsError::DbusError` if the object server rejects the path.
    pub async fn export_connection(
        &self,
        connection: &Arc<SettingsConnection>,
    ) -> Result<(), NetworkSettingsError> {
        let path = connection.path().as_str();
        let server = self.conn.object_server();

        server
            .at(path, ConnectionInterface::new(Arc::clone(connection)))
            .await?;
        server
            .at(
                path,
                ConnectionSecretsInterface::new(Arc::clone(connection), self.secrets_timeout),
            )
            .await?;

        debug!(path, "exported connection");
        Ok(())
    }

    /// Removes the settings and secrets objects of a connection that is no
    /// longer registered.
    ///
    /// # Errors
    ///
    /// Returns `NetworkSettingsError::DbusError` if an object was not exported.
    pub async fn withdraw_connection(
        &self,
        connection: &SettingsConnection,
    ) -> Result<(), NetworkSettingsError> {
        let path = connection.path().as_str();
        let server = self.conn.object_server();

        server.remove::<ConnectionSecretsInterface, _>(path).await?;
        server.remove::<ConnectionInterface, _>(path).await?;

        debug!(path, "withdrew connection");
        Ok(())
    }

    /// Emits `NewConnection` for `path` from the registry object.
    ///
    /// # Errors
    ///
    /// Returns `NetworkSettingsError::DbusError` if the signal cannot be sent.
    pub async fn announce(&self, path: &OwnedObjectPath) -> Result<(), NetworkSettingsError> {
        let emitter = SignalEmitter::new(&self.conn, self.settings_path.as_str())?;
        SettingsInterface::new_connection(&emitter, path).await?;
        Ok(())
    }
}
