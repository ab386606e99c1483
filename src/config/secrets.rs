use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Secrets request handling.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SecretsConfig {
    /// Seconds a deferred `GetSecrets` call waits for the subscriber before
    /// failing. When absent the call waits until it is answered or abandoned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl SecretsConfig {
    /// Timeout applied to deferred secrets replies, if any.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}
