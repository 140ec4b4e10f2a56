use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use futures::StreamExt;

use dlsig_core::signal::{Lifetime, Observer, SignalEvent, SignalProducer};

type Slot<T> = Arc<Mutex<Option<T>>>;

/// Producer whose start handler parks its observer and lifetime in slots.
fn parked_producer() -> (
    SignalProducer<u32, String>,
    Slot<Observer<u32, String>>,
    Slot<Lifetime>,
) {
    let observer_slot: Slot<Observer<u32, String>> = Arc::new(Mutex::new(None));
    let lifetime_slot: Slot<Lifetime> = Arc::new(Mutex::new(None));
    let (o, l) = (Arc::clone(&observer_slot), Arc::clone(&lifetime_slot));

    let producer = SignalProducer::new(move |observer, lifetime| {
        *o.lock().unwrap() = Some(observer);
        *l.lock().unwrap() = Some(lifetime);
    });
    (producer, observer_slot, lifetime_slot)
}

// ---------------------------------------------------------------
// cold start
// ---------------------------------------------------------------

#[tokio::test]
async fn test_handler_does_not_run_until_started() {
    let started = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&started);
    let producer: SignalProducer<u32, String> = SignalProducer::new(move |observer, _lifetime| {
        flag.store(true, Ordering::SeqCst);
        observer.send_completed();
    });

    assert!(!started.load(Ordering::SeqCst));
    let signal = producer.start();
    assert!(started.load(Ordering::SeqCst));

    let events: Vec<_> = signal.collect().await;
    assert_eq!(events, vec![SignalEvent::Completed]);
}

#[tokio::test]
async fn test_dropping_unstarted_producer_runs_nothing() {
    let started = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&started);
    let producer: SignalProducer<u32, String> =
        SignalProducer::new(move |_observer, _lifetime| flag.store(true, Ordering::SeqCst));
    drop(producer);
    assert!(!started.load(Ordering::SeqCst));
}

// ---------------------------------------------------------------
// ordering and termination
// ---------------------------------------------------------------

#[tokio::test]
async fn test_values_arrive_in_order_then_completion() {
    let producer: SignalProducer<u32, String> = SignalProducer::new(|observer, _lifetime| {
        for i in 1..=3 {
            observer.send_value(i);
        }
        observer.send_completed();
        observer.send_value(4);
    });

    let events: Vec<_> = producer.start().collect().await;
    assert_eq!(
        events,
        vec![
            SignalEvent::Value(1),
            SignalEvent::Value(2),
            SignalEvent::Value(3),
            SignalEvent::Completed,
        ]
    );
}

#[tokio::test]
async fn test_nothing_is_delivered_after_failure() {
    let producer: SignalProducer<u32, String> = SignalProducer::new(|observer, _lifetime| {
        assert!(observer.send_failed("boom".to_string()));
        assert!(!observer.send_value(1));
        assert!(!observer.send_completed());
    });

    let events: Vec<_> = producer.start().collect().await;
    assert_eq!(events, vec![SignalEvent::Failed("boom".to_string())]);
}

#[tokio::test]
async fn test_next_result_maps_events() {
    let producer: SignalProducer<u32, String> = SignalProducer::new(|observer, _lifetime| {
        observer.send_value(7);
        observer.send_failed("bad".to_string());
    });

    let mut signal = producer.start();
    assert_eq!(signal.next_result().await, Some(Ok(7)));
    assert_eq!(signal.next_result().await, Some(Err("bad".to_string())));
    assert_eq!(signal.next_result().await, None);
    assert!(signal.is_terminated());
}

#[tokio::test]
async fn test_signal_ends_when_observer_is_dropped() {
    let (producer, observer_slot, _lifetime_slot) = parked_producer();
    let mut signal = producer.start();

    observer_slot.lock().unwrap().take();
    assert_eq!(signal.next_result().await, None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_values_sent_from_another_thread_keep_order() {
    let producer: SignalProducer<u32, String> = SignalProducer::new(|observer, _lifetime| {
        std::thread::spawn(move || {
            for i in 0..100 {
                observer.send_value(i);
            }
            observer.send_completed();
        });
    });

    let events: Vec<_> = producer.start().collect().await;
    assert_eq!(events.len(), 101);
    for (i, event) in events.iter().take(100).enumerate() {
        assert_eq!(*event, SignalEvent::Value(i as u32));
    }
    assert_eq!(events[100], SignalEvent::Completed);
}

// ---------------------------------------------------------------
// lifetime
// ---------------------------------------------------------------

#[tokio::test]
async fn test_terminal_event_ends_lifetime() {
    let (producer, observer_slot, lifetime_slot) = parked_producer();
    let _signal = producer.start();

    let lifetime = lifetime_slot.lock().unwrap().clone().unwrap();
    assert!(!lifetime.is_ended());

    let observer = observer_slot.lock().unwrap().clone().unwrap();
    observer.send_completed();
    assert!(lifetime.is_ended());
}

#[tokio::test]
async fn test_dispose_ends_lifetime() {
    let (producer, _observer_slot, lifetime_slot) = parked_producer();
    let signal = producer.start();
    let lifetime = lifetime_slot.lock().unwrap().clone().unwrap();

    let waiter = tokio::spawn({
        let lifetime = lifetime.clone();
        async move { lifetime.ended().await }
    });

    signal.dispose();
    waiter.await.unwrap();
    assert!(lifetime.is_ended());
}

#[tokio::test]
async fn test_dropping_signal_ends_lifetime() {
    let (producer, observer_slot, lifetime_slot) = parked_producer();
    let signal = producer.start();
    drop(signal);

    assert!(lifetime_slot.lock().unwrap().as_ref().unwrap().is_ended());
    // The consumer is gone, so sends report failure instead of panicking.
    let observer = observer_slot.lock().unwrap().clone().unwrap();
    assert!(!observer.send_value(1));
}

// ---------------------------------------------------------------
// start_with_result
// ---------------------------------------------------------------

#[tokio::test]
async fn test_start_with_result_reports_values_and_failure() {
    let producer: SignalProducer<u32, String> = SignalProducer::new(|observer, _lifetime| {
        observer.send_value(7);
        observer.send_failed("stopped".to_string());
    });

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let disposable = producer.start_with_result(move |result| {
        let _ = tx.send(result);
    });

    let mut results = Vec::new();
    while let Some(result) = rx.recv().await {
        results.push(result);
    }

    assert_eq!(results, vec![Ok(7), Err("stopped".to_string())]);
    assert!(disposable.is_disposed());
}
