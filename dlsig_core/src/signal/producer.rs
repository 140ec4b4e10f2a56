use tokio::sync::mpsc;

use super::lifetime::{Disposable, Lifetime};
use super::observer::Observer;
use super::stream::Signal;

type StartHandler<T, E> = Box<dyn FnOnce(Observer<T, E>, Lifetime) + Send + 'static>;

/// A cold signal: the start handler runs only when the producer is started,
/// and a producer can be started once.
pub struct SignalProducer<T, E> {
    handler: StartHandler<T, E>,
}

impl<T, E> SignalProducer<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    pub fn new<F>(handler: F) -> Self
    where
        F: FnOnce(Observer<T, E>, Lifetime) + Send + 'static,
    {
        Self {
            handler: Box::new(handler),
        }
    }

    /// Runs the start handler on the calling thread and returns the consumer side.
    pub fn start(self) -> Signal<T, E> {
        let (tx, rx) = mpsc::unbounded_channel();
        let lifetime = Lifetime::new();
        let disposable = lifetime.disposable();
        let observer = Observer::new(tx, lifetime.clone());

        (self.handler)(observer, lifetime);

        Signal::new(rx, disposable)
    }

    /// Starts the producer and drives the signal on a spawned task, calling
    /// `callback` with every value (`Ok`) and with the failure (`Err`).
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn start_with_result<F>(self, mut callback: F) -> Disposable
    where
        F: FnMut(Result<T, E>) + Send + 'static,
    {
        let mut signal = self.start();
        let disposable = signal.disposable();

        tokio::spawn(async move {
            while let Some(result) = signal.next_result().await {
                callback(result);
            }
        });

        disposable
    }
}
