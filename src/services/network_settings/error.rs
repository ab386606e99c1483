use zbus::fdo;

/// Network settings service errors
#[derive(thiserror::Error, Debug)]
pub enum NetworkSettingsError {
    /// D-Bus communication error
    #[error("D-Bus operation failed: {0}")]
    DbusError(#[from] zbus::Error),

    /// Service initialization failed (bus connection, name request, object export)
    #[error("Failed to initialize settings service: {0}")]
    ServiceInitializationFailed(String),

    /// A minted or configured object path is not a valid D-Bus path
    #[error("Invalid object path {path}: {reason}")]
    InvalidObjectPath {
        /// The rejected path.
        path: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Settings values could not be copied
    #[error("Failed to copy settings of {path}: {reason}")]
    SettingsCopyFailed {
        /// Object path of the connection.
        path: String,
        /// Reason for the failure.
        reason: String,
    },

    /// A listener rejected an event
    #[error("Event dispatch failed after {delivered} listener(s): {reason}")]
    DispatchFailed {
        /// Listeners that accepted the event.
        delivered: usize,
        /// The first failure reported.
        reason: String,
    },

    /// The receiving end of an event subscription is gone
    #[error("Event subscriber is closed")]
    SubscriberClosed,
}

/// Outcome of a secrets request that did not produce secrets.
///
/// Delivered through the error continuation of a request, and turned into
/// a D-Bus error for the remote caller.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SecretsError {
    /// The user or the provider declined to supply secrets
    #[error("Secrets request was canceled")]
    Canceled,

    /// Nobody is subscribed to answer secrets requests
    #[error("No secrets provider is available")]
    NoProvider,

    /// Every holder of the request dropped it without answering
    #[error("Secrets request was abandoned without an answer")]
    Abandoned,

    /// Raising the secrets request event failed
    #[error("Secrets request could not be dispatched: {0}")]
    DispatchFailed(String),

    /// The provider did not answer in time
    #[error("Secrets request timed out")]
    TimedOut,

    /// The provider failed for another reason
    #[error("Secrets request failed: {0}")]
    Failed(String),
}

impl From<SecretsError> for fdo::Error {
    fn from(error: SecretsError) -> Self {
        match error {
            SecretsError::NoProvider => fdo::Error::ServiceUnknown(error.to_string()),
            SecretsError::TimedOut => fdo::Error::TimedOut(error.to_string()),
            SecretsError::Canceled => fdo::Error::AccessDenied(error.to_string()),
            SecretsError::Abandoned | SecretsError::DispatchFailed(_) | SecretsError::Failed(_) => {
                fdo::Error::Failed(error.to_string())
            }
        }
    }
}

impl From<NetworkSettingsError> for fdo::Error {
    fn from(error: NetworkSettingsError) -> Self {
        fdo::Error::Failed(error.to_string())
    }
}
