//! Secrets request hand-off.
//!
//! A caller asking for secrets gets a [`PendingSecrets`] and hands the
//! matching [`SecretsResponder`] down the event chain. Whoever ends up
//! holding the responder answers through `reply` or `error`, exactly once.

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::debug;

use super::{SecretsError, SettingsMap, connection::SettingsConnection};

type SecretsReply = Result<SettingsMap, SecretsError>;

/// Reply/error continuation of one secrets request.
///
/// Clones share the same request: the first `reply` or `error` completes it
/// and every later call is ignored. If all clones are dropped without an
/// answer, the waiting caller sees [`SecretsError::Abandoned`].
#[derive(Clone)]
pub struct SecretsResponder {
    slot: Arc<Mutex<Option<oneshot::Sender<SecretsReply>>>>,
}

impl SecretsResponder {
    /// Creates a responder and the caller half waiting on it.
    pub fn channel() -> (Self, PendingSecrets) {
        let (tx, rx) = oneshot::channel();
        let responder = Self {
            slot: Arc::new(Mutex::new(Some(tx))),
        };
        (responder, PendingSecrets { rx })
    }

    /// Completes the request with `secrets`.
    ///
    /// Returns `false` if the request was already completed or the caller
    /// stopped waiting.
    pub fn reply(&self, secrets: SettingsMap) -> bool {
        self.complete(Ok(secrets))
    }

    /// Completes the request with a failure.
    ///
    /// Returns `false` if the request was already completed or the caller
    /// stopped waiting.
    pub fn error(&self, error: SecretsError) -> bool {
        self.complete(Err(error))
    }

    /// Whether `reply` or `error` has already been called.
    pub fn is_completed(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn complete(&self, outcome: SecretsReply) -> bool {
        let sender = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match sender {
            Some(tx) => tx.send(outcome).is_ok(),
            None => {
                debug!("secrets request already completed, ignoring answer");
                false
            }
        }
    }
}

impl fmt::Debug for SecretsResponder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretsResponder")
            .field("completed", &self.is_completed())
            .finish()
    }
}

/// Caller half of a secrets request.
#[derive(Debug)]
pub struct PendingSecrets {
    rx: oneshot::Receiver<SecretsReply>,
}

impl PendingSecrets {
    /// Waits for the answer.
    ///
    /// # Errors
    ///
    /// Returns the error the provider answered with, or
    /// `SecretsError::Abandoned` if the request was dropped unanswered.
    pub async fn wait(self) -> SecretsReply {
        self.rx.await.unwrap_or(Err(SecretsError::Abandoned))
    }

    /// Takes the answer if one is already there.
    ///
    /// Returns `None` while the request is still outstanding.
    pub fn try_take(&mut self) -> Option<SecretsReply> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(SecretsError::Abandoned)),
        }
    }
}

/// Payload of a connection's secrets-request event.
#[derive(Debug, Clone)]
pub struct SecretsRequest {
    /// Setting group the caller needs secrets for, e.g. `802-11-wireless-security`.
    pub setting_name: String,
    /// Keys the caller hinted at.
    pub hints: Vec<String>,
    /// The caller asked for fresh secrets, bypassing the cache.
    pub request_new: bool,
    /// Continuation of the original caller.
    pub responder: SecretsResponder,
}

/// Secrets request relayed by the registry, tagged with its connection.
#[derive(Debug, Clone)]
pub struct ConnectionSecretsRequest {
    /// The connection that raised the request.
    pub connection: Arc<SettingsConnection>,
    /// The request as raised by the connection.
    pub request: SecretsRequest,
}

impl ConnectionSecretsRequest {
    /// Answers the request with `secrets`.
    pub fn reply(&self, secrets: SettingsMap) -> bool {
        self.request.responder.reply(secrets)
    }

    /// Fails the request.
    pub fn error(&self, error: SecretsError) -> bool {
        self.request.responder.error(error)
    }
}
