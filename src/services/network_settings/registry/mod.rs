mod interface;

use std::sync::{Arc, PoisonError, RwLock};

use futures::Stream;
use tracing::{debug, info, warn};
use zbus::zvariant::OwnedObjectPath;

pub use interface::SettingsInterface;

use super::{
    NetworkSettingsError,
    connection::SettingsConnection,
    secrets::ConnectionSecretsRequest,
    signal::{Signal, SignalStream, SubscriptionId},
};
use crate::services::common::Property;

struct Entry {
    ssid: String,
    connection: Arc<SettingsConnection>,
    relay: SubscriptionId,
}

/// The set of known connection profiles.
///
/// Profiles are keyed by SSID and listed in registration order. Every
/// secrets request raised by a registered profile is relayed on the
/// registry's own event, tagged with the profile, so a single subscriber
/// can serve all of them.
pub struct Registry {
    connections: RwLock<Vec<Entry>>,
    secrets_request: Arc<Signal<ConnectionSecretsRequest>>,
    new_connection: Arc<Signal<OwnedObjectPath>>,
    paths: Property<Vec<OwnedObjectPath>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(Vec::new()),
            secrets_request: Arc::new(Signal::new()),
            new_connection: Arc::new(Signal::new()),
            paths: Property::new(Vec::new()),
        }
    }

    /// Object paths of all registered profiles, in registration order.
    pub fn list_connections(&self) -> Vec<OwnedObjectPath> {
        self.read_entries(|entries| {
            entries
                .iter()
                .map(|entry| entry.connection.path().clone())
                .collect()
        })
    }

    /// All registered profiles, in registration order.
    pub fn connections(&self) -> Vec<Arc<SettingsConnection>> {
        self.read_entries(|entries| {
            entries
                .iter()
                .map(|entry| Arc::clone(&entry.connection))
                .collect()
        })
    }

    /// The profile registered under `ssid`.
    pub fn find(&self, ssid: &str) -> Option<Arc<SettingsConnection>> {
        self.read_entries(|entries| {
            entries
                .iter()
                .find(|entry| entry.ssid == ssid)
                .map(|entry| Arc::clone(&entry.connection))
        })
    }

    /// Number of registered profiles.
    pub fn len(&self) -> usize {
        self.read_entries(|entries| entries.len())
    }

    /// Whether no profile is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registers `connection` under `ssid` and announces it.
    ///
    /// The registry subscribes to the connection's secrets requests, then
    /// makes it visible to [`list_connections`], then emits the
    /// new-connection event. A connection registered under several SSIDs
    /// keeps a single subscription.
    ///
    /// A profile already registered under `ssid` is replaced in its list
    /// position. Once it is no longer registered under any SSID it is
    /// unsubscribed and returned, so its bus objects can be withdrawn.
    ///
    /// Only [`SettingsDirectory`](super::SettingsDirectory) registers
    /// connections, so every listed path is also exported.
    ///
    /// [`list_connections`]: Registry::list_connections
    pub(crate) fn add_connection(
        &self,
        ssid: impl Into<String>,
        connection: Arc<SettingsConnection>,
    ) -> Option<Arc<SettingsConnection>> {
        let ssid = ssid.into();
        let path = connection.path().clone();

        let replaced = {
            let mut entries = self
                .connections
                .write()
                .unwrap_or_else(PoisonError::into_inner);

            let relay = match entries
                .iter()
                .find(|existing| Arc::ptr_eq(&existing.connection, &connection))
            {
                Some(existing) => existing.relay,
                None => self.relay_secrets_requests(&connection),
            };
            let entry = Entry {
                ssid: ssid.clone(),
                connection,
                relay,
            };

            let previous = match entries.iter_mut().find(|existing| existing.ssid == ssid) {
                Some(existing) => Some(std::mem::replace(existing, entry)),
                None => {
                    entries.push(entry);
                    None
                }
            };

            let replaced = previous.filter(|previous| {
                !entries
                    .iter()
                    .any(|entry| Arc::ptr_eq(&entry.connection, &previous.connection))
            });
            let replaced = replaced.map(|previous| {
                previous
                    .connection
                    .secrets_request()
                    .disconnect(previous.relay);
                previous.connection
            });

            self.paths.set(
                entries
                    .iter()
                    .map(|entry| entry.connection.path().clone())
                    .collect(),
            );
            replaced
        };

        match &replaced {
            Some(previous) => warn!(
                ssid = %ssid,
                old = %previous.path(),
                new = %path,
                "replaced connection registered under the same SSID"
            ),
            None => info!(ssid = %ssid, path = %path, "registered connection"),
        }

        if let Err(err) = self.new_connection.send(path) {
            warn!(error = %err, "new connection listener failed");
        }

        replaced
    }

    /// Subscribes a listener to secrets requests from every registered profile.
    pub fn connect_secrets_request<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(ConnectionSecretsRequest) -> Result<(), NetworkSettingsError>
            + Send
            + Sync
            + 'static,
    {
        self.secrets_request.connect(listener)
    }

    /// Removes a listener added with [`Registry::connect_secrets_request`].
    pub fn disconnect_secrets_request(&self, id: SubscriptionId) -> bool {
        self.secrets_request.disconnect(id)
    }

    /// Stream of secrets requests from every registered profile.
    pub fn secrets_requests(&self) -> SignalStream<ConnectionSecretsRequest> {
        self.secrets_request.subscribe()
    }

    /// Stream of object paths of newly registered profiles.
    ///
    /// Each path is already listed by [`Registry::list_connections`] when it
    /// is delivered.
    pub fn new_connections(&self) -> SignalStream<OwnedObjectPath> {
        self.new_connection.subscribe()
    }

    /// Watch the list of registered object paths.
    pub fn watch_connections(&self) -> impl Stream<Item = Vec<OwnedObjectPath>> + Send + use<> {
        self.paths.watch()
    }

    fn relay_secrets_requests(&self, connection: &Arc<SettingsConnection>) -> SubscriptionId {
        let target = Arc::clone(&self.secrets_request);
        let origin = Arc::downgrade(connection);

        connection.secrets_request().connect(move |request| {
            let Some(connection) = origin.upgrade() else {
                return Ok(());
            };
            debug!(path = %connection.path(), "relaying secrets request");

            let delivered = target.send(ConnectionSecretsRequest {
                connection,
                request,
            })?;
            if delivered == 0 {
                warn!("no secrets subscriber attached to the registry");
            }
            Ok(())
        })
    }

    fn read_entries<R>(&self, read: impl FnOnce(&[Entry]) -> R) -> R {
        let entries = self
            .connections
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        read(&entries)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("connections", &self.list_connections())
            .finish()
    }
}
