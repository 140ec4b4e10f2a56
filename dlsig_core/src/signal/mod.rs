//! Cold, single-subscription push streams.
//!
//! A [`SignalProducer`] does nothing until [`SignalProducer::start`] is called.
//! Starting it runs the producer's start handler with a fresh [`Observer`] and
//! [`Lifetime`], and hands the consumer a [`Signal`]. The observer pushes an
//! ordered sequence of values followed by exactly one terminal event.

pub mod lifetime;
pub mod observer;
pub mod producer;
pub mod stream;

pub use lifetime::{Disposable, Lifetime};
pub use observer::{Observer, SignalEvent};
pub use producer::SignalProducer;
pub use stream::Signal;
