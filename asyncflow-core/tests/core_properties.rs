// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use asyncflow_core::cancellation_token::Cancellable;
use asyncflow_core::{AsyncFlowError, CancellationToken, Executor, Fallible, Producer, Promise};
use asyncflow_test_utils::EventRecorder;

fn immediate() -> Executor {
    Executor::Immediate
}

#[test]
fn completion_uniqueness_across_concurrent_callers() {
    let promise: Promise<u32> = Promise::new(None::<fn()>);
    let winners = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let promise = promise.clone();
            let winners = Arc::clone(&winners);
            std::thread::spawn(move || {
                if promise.try_complete(Fallible::success(i), None) {
                    winners.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(winners.load(Ordering::SeqCst), 1, "exactly one tryComplete must win");
    assert!(promise.future().is_completed());
}

#[test]
fn delivery_uniqueness_each_subscriber_sees_exactly_one_completion() {
    let promise: Promise<u32> = Promise::new(None::<fn()>);
    let future = promise.future();

    let recorders: Vec<_> = (0..16).map(|_| EventRecorder::<u32, AsyncFlowError>::new()).collect();
    let _handlers: Vec<_> = recorders
        .iter()
        .map(|recorder| future.subscribe(immediate(), recorder.future_callback()))
        .collect();

    promise.try_complete(Fallible::success(7), None);

    for recorder in &recorders {
        assert_eq!(recorder.len(), 1, "each subscriber must see exactly one completion");
    }
}

#[test]
fn late_subscription_to_completed_future_never_hangs() {
    let promise: Promise<u32> = Promise::new(None::<fn()>);
    promise.try_complete(Fallible::success(99), None);

    let future = promise.future();
    let recorder = EventRecorder::<u32, AsyncFlowError>::new();
    let _handler = future.subscribe(immediate(), recorder.future_callback());

    assert!(recorder.wait_for_count(1, Duration::from_millis(200)));
}

#[test]
fn replay_correctness_bounded_backlog_then_live_updates() {
    let producer: Producer<u32> = Producer::new(3, None::<fn()>);
    for value in 1..=5u32 {
        producer.send(value, None);
    }
    // Buffer capacity 3: the last three pre-subscription updates are 3,4,5.

    let recorder = EventRecorder::<u32, AsyncFlowError>::new();
    let _handler = producer.channel().subscribe(immediate(), recorder.callback());
    producer.send(6, None);

    let events = recorder.take();
    let updates: Vec<u32> = events
        .into_iter()
        .filter_map(|event| match event {
            asyncflow_test_utils::RecordedEvent::Update(v) => Some(v),
            asyncflow_test_utils::RecordedEvent::Completion(_) => None,
        })
        .collect();

    assert_eq!(updates, vec![3, 4, 5, 6]);
}

#[test]
fn cancellation_propagation_to_current_and_subsequent_dependents() {
    let token = CancellationToken::new();

    let early: Promise<u32> = Promise::new(None::<fn()>);
    token.add(Arc::new(early.clone()));

    token.cancel();

    let late: Promise<u32> = Promise::new(None::<fn()>);
    token.add(Arc::new(late.clone()));

    assert!(matches!(
        early.future().wait(Some(Duration::from_millis(50))).as_deref(),
        Some(Fallible::Failure(AsyncFlowError::Cancelled))
    ));
    assert!(matches!(
        late.future().wait(Some(Duration::from_millis(50))).as_deref(),
        Some(Fallible::Failure(AsyncFlowError::Cancelled))
    ));
}

#[tokio::test]
async fn scenario_cancel_before_wait() {
    let promise: Promise<u32> = Promise::new(None::<fn()>);
    let token = CancellationToken::new();
    token.add(Arc::new(promise.clone()));
    token.cancel();

    let result = promise.future().wait(Some(Duration::from_millis(100)));
    assert!(matches!(
        result.as_deref(),
        Some(Fallible::Failure(AsyncFlowError::Cancelled))
    ));
}

#[tokio::test]
async fn scenario_delayed_completion_raced_by_cancellation() {
    let promise: Promise<u32> = Promise::new(None::<fn()>);
    let token = CancellationToken::new();
    token.add(Arc::new(promise.clone()));

    let delayed = promise.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        delayed.try_complete(Fallible::success(42), None);
    });

    token.cancel();

    let result = promise.future().wait(Some(Duration::from_millis(500)));
    assert!(matches!(
        result.as_deref(),
        Some(Fallible::Failure(AsyncFlowError::Cancelled))
    ));
}

#[test]
fn ordering_per_subscriber_is_a_prefix_of_total_order() {
    let producer: Producer<u32> = Producer::new(8, None::<fn()>);
    let recorder = EventRecorder::<u32, AsyncFlowError>::new();
    let _handler = producer.channel().subscribe(immediate(), recorder.callback());

    for value in 0..20u32 {
        producer.send(value, None);
    }
    producer.complete(Fallible::success(()), None);

    let events = recorder.take();
    let mut seen_updates = Vec::new();
    let mut saw_completion = false;
    for event in events {
        match event {
            asyncflow_test_utils::RecordedEvent::Update(v) => {
                assert!(!saw_completion, "no update may follow completion");
                seen_updates.push(v);
            }
            asyncflow_test_utils::RecordedEvent::Completion(result) => {
                assert!(result.is_success());
                saw_completion = true;
            }
        }
    }

    assert_eq!(seen_updates, (0..20u32).collect::<Vec<_>>());
    assert!(saw_completion);
}

#[test]
fn send_after_complete_is_a_no_op() {
    let producer: Producer<u32> = Producer::new(4, None::<fn()>);
    producer.complete(Fallible::success(()), None);

    assert!(!producer.send(1, None), "send after completion must report rejection");

    let recorder = EventRecorder::<u32, AsyncFlowError>::new();
    let _handler = producer.channel().subscribe(immediate(), recorder.callback());
    let events = recorder.take();
    assert_eq!(events.len(), 1, "late subscriber only sees the stored completion");
}
