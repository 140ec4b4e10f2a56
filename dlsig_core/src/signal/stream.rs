use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;

use super::lifetime::Disposable;
use super::observer::SignalEvent;

/// Consumer side of a started [`SignalProducer`](super::SignalProducer).
///
/// Yields events in the order they were sent and ends right after the terminal
/// event. Dropping the signal disposes it.
pub struct Signal<T, E> {
    rx: mpsc::UnboundedReceiver<SignalEvent<T, E>>,
    disposable: Disposable,
    terminated: bool,
}

impl<T, E> Signal<T, E> {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<SignalEvent<T, E>>, disposable: Disposable) -> Self {
        Self {
            rx,
            disposable,
            terminated: false,
        }
    }

    /// Next value as `Ok`, the failure as `Err`, or `None` once the signal
    /// completed or its producer went away.
    pub async fn next_result(&mut self) -> Option<Result<T, E>> {
        match self.next().await? {
            SignalEvent::Value(value) => Some(Ok(value)),
            SignalEvent::Failed(error) => Some(Err(error)),
            SignalEvent::Completed => None,
        }
    }

    pub fn disposable(&self) -> Disposable {
        self.disposable.clone()
    }

    /// Ends the producer's lifetime. Events already queued can still be read.
    pub fn dispose(&self) {
        self.disposable.dispose();
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }
}

impl<T, E> Stream for Signal<T, E> {
    type Item = SignalEvent<T, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.terminated {
            return Poll::Ready(None);
        }
        match this.rx.poll_recv(cx) {
            Poll::Ready(Some(event)) => {
                if event.is_terminal() {
                    this.terminated = true;
                }
                Poll::Ready(Some(event))
            }
            Poll::Ready(None) => {
                this.terminated = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T, E> Drop for Signal<T, E> {
    fn drop(&mut self) {
        self.disposable.dispose();
    }
}
