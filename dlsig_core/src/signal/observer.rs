use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use super::lifetime::Lifetime;

/// One event pushed through a signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalEvent<T, E> {
    Value(T),
    Completed,
    Failed(E),
}

impl<T, E> SignalEvent<T, E> {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SignalEvent::Value(_))
    }
}

/// Producer-side handle of a started signal.
///
/// Cloning shares the same underlying stream. After the first terminal event
/// every further send is refused and returns `false`.
pub struct Observer<T, E> {
    inner: Arc<ObserverInner<T, E>>,
}

struct ObserverInner<T, E> {
    /// `None` once a terminal event has been sent.
    tx: Mutex<Option<mpsc::UnboundedSender<SignalEvent<T, E>>>>,
    lifetime: Lifetime,
}

impl<T, E> Clone for Observer<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E> Observer<T, E> {
    pub(crate) fn new(tx: mpsc::UnboundedSender<SignalEvent<T, E>>, lifetime: Lifetime) -> Self {
        Self {
            inner: Arc::new(ObserverInner {
                tx: Mutex::new(Some(tx)),
                lifetime,
            }),
        }
    }

    fn sender(&self) -> MutexGuard<'_, Option<mpsc::UnboundedSender<SignalEvent<T, E>>>> {
        self.inner.tx.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pushes a value. Returns `false` if the signal already terminated or the
    /// consumer is gone.
    pub fn send_value(&self, value: T) -> bool {
        match self.sender().as_ref() {
            Some(tx) => tx.send(SignalEvent::Value(value)).is_ok(),
            None => {
                log::debug!("[Observer] value dropped: signal already terminated");
                false
            }
        }
    }

    pub fn send_completed(&self) -> bool {
        self.terminate(SignalEvent::Completed)
    }

    pub fn send_failed(&self, error: E) -> bool {
        self.terminate(SignalEvent::Failed(error))
    }

    pub fn is_terminated(&self) -> bool {
        self.sender().is_none()
    }

    fn terminate(&self, event: SignalEvent<T, E>) -> bool {
        let tx = self.sender().take();
        let delivered = match tx {
            Some(tx) => tx.send(event).is_ok(),
            None => {
                log::debug!("[Observer] terminal event dropped: signal already terminated");
                false
            }
        };
        self.inner.lifetime.end();
        delivered
    }
}
