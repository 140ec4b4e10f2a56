pub mod observer;
pub mod notifier;
pub mod snapshot;

pub use observer::ProgressObserver;
pub use notifier::ProgressNotifier;
pub use snapshot::ProgressSnapshot;
