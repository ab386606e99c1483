use std::sync::Arc;

use tracing::debug;
use zbus::{
    interface,
    message::Header,
    object_server::SignalEmitter,
    zvariant::{ObjectPath, OwnedObjectPath},
};

use super::Registry;

/// `org.freedesktop.NetworkManagerSettings` object of the registry.
pub struct SettingsInterface {
    registry: Arc<Registry>,
}

impl SettingsInterface {
    /// Exposes `registry` on the bus.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }
}

#[interface(name = "org.freedesktop.NetworkManagerSettings")]
impl SettingsInterface {
    /// Object paths of all known connections.
    fn list_connections(&self, #[zbus(header)] header: Header<'_>) -> Vec<OwnedObjectPath> {
        let sender = header
            .sender()
            .map(|s| s.as_str())
            .unwrap_or("<unknown>");
        debug!(method = "ListConnections", sender, "D-Bus call");
        self.registry.list_connections()
    }

    /// Emitted once per registered connection, after it is listed.
    #[zbus(signal)]
    pub async fn new_connection(
        emitter: &SignalEmitter<'_>,
        connection: &ObjectPath<'_>,
    ) -> zbus::Result<()>;
}
