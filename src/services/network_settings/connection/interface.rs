use std::{sync::Arc, time::Duration};

use tracing::debug;
use zbus::{fdo, interface, message::Header};

use super::SettingsConnection;
use crate::services::network_settings::{SecretsError, SettingsMap, secrets::SecretsResponder};

fn log_caller(method: &str, header: &Header<'_>) {
    let sender = header
        .sender()
        .map(|s| s.as_str())
        .unwrap_or("<unknown>");
    debug!(method, sender, "D-Bus call");
}

/// `org.freedesktop.NetworkManagerSettings.Connection` object of one profile.
pub struct ConnectionInterface {
    connection: Arc<SettingsConnection>,
}

impl ConnectionInterface {
    /// Exposes `connection` on the bus.
    pub fn new(connection: Arc<SettingsConnection>) -> Self {
        Self { connection }
    }
}

#[interface(name = "org.freedesktop.NetworkManagerSettings.Connection")]
impl ConnectionInterface {
    /// Settings of the profile, without secrets.
    fn get_settings(&self, #[zbus(header)] header: Header<'_>) -> fdo::Result<SettingsMap> {
        log_caller("GetSettings", &header);
        self.connection.get_settings().map_err(Into::into)
    }
}

/// `org.freedesktop.NetworkManagerSettings.Connection.Secrets` object of one profile.
pub struct ConnectionSecretsInterface {
    connection: Arc<SettingsConnection>,
    timeout: Option<Duration>,
}

impl ConnectionSecretsInterface {
    /// Exposes the secrets of `connection` on the bus.
    ///
    /// A deferred reply fails with a timeout error after `timeout`, if set.
    pub fn new(connection: Arc<SettingsConnection>, timeout: Option<Duration>) -> Self {
        Self {
            connection,
            timeout,
        }
    }
}

#[interface(name = "org.freedesktop.NetworkManagerSettings.Connection.Secrets")]
impl ConnectionSecretsInterface {
    /// Secrets of the profile.
    ///
    /// Answered from the cache when possible. Otherwise the reply is
    /// deferred until a secrets subscriber answers the request.
    async fn get_secrets(
        &self,
        setting_name: String,
        hints: Vec<String>,
        request_new: bool,
        #[zbus(header)] header: Header<'_>,
    ) -> fdo::Result<SettingsMap> {
        log_caller("GetSecrets", &header);

        let (responder, pending) = SecretsResponder::channel();
        let delivery = self
            .connection
            .get_secrets(&setting_name, &hints, request_new, responder);
        debug!(path = %self.connection.path(), ?delivery, "GetSecrets dispatched");

        let outcome = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, pending.wait())
                .await
                .unwrap_or(Err(SecretsError::TimedOut)),
            None => pending.wait().await,
        };

        outcome.map_err(Into::into)
    }
}
