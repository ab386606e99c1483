//! In-process publish/subscribe channel.
//!
//! A [`Signal`] lets one producer notify any number of listeners without
//! knowing who they are. Connections use it to raise secrets requests, the
//! registry uses it to relay them and to announce new connections.

use std::{
    fmt,
    pin::Pin,
    sync::{
        Arc, Mutex, PoisonError, Weak,
        atomic::{AtomicU64, Ordering},
    },
    task::{Context, Poll},
};

use futures::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::trace;

use super::NetworkSettingsError;

/// Handle identifying one listener of a [`Signal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<T> = Arc<dyn Fn(T) -> Result<(), NetworkSettingsError> + Send + Sync>;

/// Publish/subscribe channel delivering `T` payloads to every listener.
pub struct Signal<T> {
    listeners: Mutex<Vec<(SubscriptionId, Listener<T>)>>,
    next_id: AtomicU64,
}

impl<T: Clone + Send + 'static> Signal<T> {
    /// Creates a signal with no listeners.
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Registers a listener. It is called synchronously from [`Signal::send`].
    pub fn connect<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(T) -> Result<(), NetworkSettingsError> + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was not connected.
    pub fn disconnect(&self, id: SubscriptionId) -> bool {
        let mut listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    /// Number of connected listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Delivers `payload` to every listener and returns how many accepted it.
    ///
    /// Listeners run outside the internal lock, so they may connect or
    /// disconnect listeners themselves. Every listener is called even when
    /// an earlier one fails.
    ///
    /// # Errors
    ///
    /// Returns `NetworkSettingsError::DispatchFailed` carrying the first
    /// listener failure.
    pub fn send(&self, payload: T) -> Result<usize, NetworkSettingsError> {
        let snapshot: Vec<Listener<T>> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        let mut delivered = 0;
        let mut first_failure = None;
        for listener in snapshot {
            match listener(payload.clone()) {
                Ok(()) => delivered += 1,
                Err(err) => {
                    trace!(error = %err, "listener rejected event");
                    if first_failure.is_none() {
                        first_failure = Some(err);
                    }
                }
            }
        }

        match first_failure {
            None => Ok(delivered),
            Some(err) => Err(NetworkSettingsError::DispatchFailed {
                delivered,
                reason: err.to_string(),
            }),
        }
    }

    /// Subscribes through a channel, for consumers living on another task.
    ///
    /// Dropping the returned stream disconnects its listener.
    pub fn subscribe(self: &Arc<Self>) -> SignalStream<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.connect(move |payload| {
            tx.send(payload)
                .map_err(|_| NetworkSettingsError::SubscriberClosed)
        });

        SignalStream {
            inner: UnboundedReceiverStream::new(rx),
            signal: Arc::downgrade(self),
            id,
        }
    }
}

impl<T: Clone + Send + 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self
            .listeners
            .lock()
            .map(|listeners| listeners.len())
            .unwrap_or_default();
        f.debug_struct("Signal")
            .field("listeners", &listeners)
            .finish()
    }
}

/// Stream of payloads delivered to one [`Signal`] subscription.
pub struct SignalStream<T: Clone + Send + 'static> {
    inner: UnboundedReceiverStream<T>,
    signal: Weak<Signal<T>>,
    id: SubscriptionId,
}

impl<T: Clone + Send + 'static> SignalStream<T> {
    /// The subscription backing this stream.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl<T: Clone + Send + 'static> Stream for SignalStream<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        Pin::new(&mut self.get_mut().inner).poll_next(cx)
    }
}

impl<T: Clone + Send + 'static> Drop for SignalStream<T> {
    fn drop(&mut self) {
        if let Some(signal) = self.signal.upgrade() {
            signal.disconnect(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use futures::StreamExt;

    use super::*;

    #[test]
    fn delivers_to_every_listener() {
        let signal = Signal::<u32>::new();
        let total = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let total = Arc::clone(&total);
            signal.connect(move |value| {
                total.fetch_add(value as usize, Ordering::SeqCst);
                Ok(())
            });
        }

        assert_eq!(signal.send(2).ok(), Some(3));
        assert_eq!(total.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn send_without_listeners_reaches_nobody() {
        let signal = Signal::<u32>::new();

        assert_eq!(signal.send(1).ok(), Some(0));
    }

    #[test]
    fn disconnect_stops_delivery() {
        let signal = Signal::<u32>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let id = signal.connect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert!(signal.disconnect(id));
        assert!(!signal.disconnect(id));
        assert_eq!(signal.send(1).ok(), Some(0));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failing_listener_does_not_starve_the_rest() {
        let signal = Signal::<u32>::new();
        let hits = Arc::new(AtomicUsize::new(0));

        signal.connect(|_| Err(NetworkSettingsError::SubscriberClosed));
        let counter = Arc::clone(&hits);
        signal.connect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let result = signal.send(1);
        assert!(matches!(
            result,
            Err(NetworkSettingsError::DispatchFailed { delivered: 1, .. })
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn listeners_may_disconnect_themselves() {
        let signal = Arc::new(Signal::<u32>::new());
        let weak = Arc::downgrade(&signal);
        let own_id = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&own_id);

        let id = signal.connect(move |_| {
            let own = *slot.lock().unwrap_or_else(PoisonError::into_inner);
            if let (Some(signal), Some(id)) = (weak.upgrade(), own) {
                signal.disconnect(id);
            }
            Ok(())
        });
        *own_id.lock().unwrap_or_else(PoisonError::into_inner) = Some(id);

        assert_eq!(signal.send(1).ok(), Some(1));
        assert_eq!(signal.listener_count(), 0);
    }

    #[tokio::test]
    async fn stream_receives_payloads_and_disconnects_on_drop() {
        let signal = Arc::new(Signal::<&'static str>::new());
        let mut stream = signal.subscribe();

        assert_eq!(signal.send("first").ok(), Some(1));
        assert_eq!(stream.next().await, Some("first"));

        drop(stream);
        assert_eq!(signal.listener_count(), 0);
    }
}
