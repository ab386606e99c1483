mod interface;

use std::sync::Arc;

use tracing::{debug, error, warn};
use zbus::zvariant::OwnedObjectPath;

pub use interface::{ConnectionInterface, ConnectionSecretsInterface};

use super::{
    NetworkSettingsError, SecretsError, SettingsMap, clone_settings,
    secrets::{SecretsRequest, SecretsResponder},
    signal::{Signal, SignalStream, SubscriptionId},
};

/// Whether a connection can answer secrets requests on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretsState {
    /// Secrets are held in memory and returned directly.
    Cached,
    /// Secrets must be requested from a subscriber.
    Uncached,
}

/// How a `GetSecrets` call was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretsDelivery {
    /// The continuation was invoked synchronously from the cache.
    Cached,
    /// The request was raised on the secrets-request event.
    Requested {
        /// Listeners that accepted the request.
        listeners: usize,
    },
    /// Raising the event failed; the error continuation was invoked.
    DispatchFailed,
}

/// One connection profile.
///
/// Settings are fixed at construction. Secrets, when present, are served
/// from memory; otherwise each request is raised on [`secrets_request`]
/// for a subscriber to answer.
///
/// [`secrets_request`]: SettingsConnection::secrets_request
#[derive(Debug)]
pub struct SettingsConnection {
    ssid: String,
    path: OwnedObjectPath,
    settings: SettingsMap,
    secrets: Option<SettingsMap>,
    secrets_request: Arc<Signal<SecretsRequest>>,
}

impl SettingsConnection {
    /// Creates a connection profile published at `path`.
    pub fn new(
        ssid: impl Into<String>,
        path: OwnedObjectPath,
        settings: SettingsMap,
        secrets: Option<SettingsMap>,
    ) -> Arc<Self> {
        Arc::new(Self {
            ssid: ssid.into(),
            path,
            settings,
            secrets,
            secrets_request: Arc::new(Signal::new()),
        })
    }

    /// Network identifier the profile is registered under.
    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    /// Object path the profile is published at.
    pub fn path(&self) -> &OwnedObjectPath {
        &self.path
    }

    /// Borrow the settings without copying.
    pub fn settings(&self) -> &SettingsMap {
        &self.settings
    }

    /// Copy of the settings, as returned over the bus.
    ///
    /// # Errors
    ///
    /// Returns `NetworkSettingsError::SettingsCopyFailed` if a value cannot be duplicated.
    pub fn get_settings(&self) -> Result<SettingsMap, NetworkSettingsError> {
        clone_settings(&self.settings).map_err(|err| NetworkSettingsError::SettingsCopyFailed {
            path: self.path.to_string(),
            reason: err.to_string(),
        })
    }

    /// Whether secrets are cached.
    pub fn secrets_state(&self) -> SecretsState {
        if self.secrets.is_some() {
            SecretsState::Cached
        } else {
            SecretsState::Uncached
        }
    }

    /// Event raised whenever this connection needs secrets it does not have.
    pub fn secrets_request(&self) -> &Arc<Signal<SecretsRequest>> {
        &self.secrets_request
    }

    /// Subscribes a listener to this connection's secrets requests.
    pub fn connect_secrets_request<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(SecretsRequest) -> Result<(), NetworkSettingsError> + Send + Sync + 'static,
    {
        self.secrets_request.connect(listener)
    }

    /// Stream of this connection's secrets requests.
    pub fn secrets_requests(&self) -> SignalStream<SecretsRequest> {
        self.secrets_request.subscribe()
    }

    /// Answers a secrets query through `responder`.
    ///
    /// With cached secrets and `request_new` unset the reply continuation is
    /// invoked before returning. Otherwise the request is raised on the
    /// secrets-request event and a subscriber answers later. `setting_name`
    /// and `hints` are passed through untouched for that subscriber.
    ///
    /// A failed dispatch is logged and turned into an error reply, so the
    /// caller is never left without an answer.
    pub fn get_secrets(
        &self,
        setting_name: &str,
        hints: &[String],
        request_new: bool,
        responder: SecretsResponder,
    ) -> SecretsDelivery {
        debug!(path = %self.path, setting_name, request_new, "secrets requested");

        if let Some(secrets) = self.secrets.as_ref().filter(|_| !request_new) {
            match clone_settings(secrets) {
                Ok(secrets) => responder.reply(secrets),
                Err(err) => responder.error(SecretsError::Failed(err.to_string())),
            };
            return SecretsDelivery::Cached;
        }

        let request = SecretsRequest {
            setting_name: setting_name.to_string(),
            hints: hints.to_vec(),
            request_new,
            responder: responder.clone(),
        };

        match self.secrets_request.send(request) {
            Ok(listeners) => {
                if listeners == 0 {
                    warn!(path = %self.path, "nobody is listening for secrets requests");
                }
                SecretsDelivery::Requested { listeners }
            }
            Err(err) => {
                error!(path = %self.path, error = %err, "failed to dispatch secrets request");
                responder.error(SecretsError::DispatchFailed(err.to_string()));
                SecretsDelivery::DispatchFailed
            }
        }
    }
}
