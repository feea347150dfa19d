// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::sync::{Arc, Mutex};
use std::time::Duration;

use asyncflow_combinators::{
    ChannelDebounceExt, ChannelDistinctExt, ChannelFilterExt, ChannelMapExt, FutureFlatMapExt, FutureMapExt,
};
use asyncflow_core::{AsyncFlowError, Executor, Fallible, HandlerEvent, Producer, Promise};

#[test]
fn future_map_transforms_the_success_value() {
    let promise: Promise<u32> = Promise::new(None::<fn()>);
    let future = promise.future();
    promise.try_complete(Fallible::success(1), None);

    let tripled = future.map(|v| v * 3);
    let result = tripled.wait(Some(Duration::from_millis(200)));
    assert!(matches!(result.as_deref(), Some(Fallible::Success(3))));
}

#[test]
fn future_map_forwards_failure_unchanged() {
    let promise: Promise<u32> = Promise::new(None::<fn()>);
    let future = promise.future();
    promise.try_complete(Fallible::Failure(AsyncFlowError::Cancelled), None);

    let mapped = future.map(|v| v * 3);
    let result = mapped.wait(Some(Duration::from_millis(200)));
    assert!(matches!(result.as_deref(), Some(Fallible::Failure(AsyncFlowError::Cancelled))));
}

#[test]
fn future_flat_map_chains_into_the_inner_future() {
    let outer: Promise<u32> = Promise::new(None::<fn()>);
    let outer_future = outer.future();
    outer.try_complete(Fallible::success(2), None);

    let chained = outer_future.flat_map(|v| {
        let inner: Promise<u32> = Promise::new(None::<fn()>);
        inner.try_complete(Fallible::success(v * 10), None);
        inner.future()
    });

    let result = chained.wait(Some(Duration::from_millis(200)));
    assert!(matches!(result.as_deref(), Some(Fallible::Success(20))));
}

#[test]
fn channel_map_preserves_order() {
    let producer: Producer<u32> = Producer::new(8, None::<fn()>);
    let channel = producer.channel();
    let doubled = channel.map(|v| v * 2);

    let collected = Arc::new(Mutex::new(Vec::new()));
    let collected_for_closure = Arc::clone(&collected);
    let _handler = doubled.subscribe(Executor::Immediate, move |event, _from| {
        if let HandlerEvent::Update(value) = event {
            collected_for_closure.lock().unwrap().push(value);
        }
    });

    for value in [1, 2, 3, 4, 5] {
        producer.send(value, None);
    }

    assert_eq!(*collected.lock().unwrap(), vec![2, 4, 6, 8, 10]);
}

#[test]
fn channel_filter_drops_values_failing_the_predicate() {
    let producer: Producer<u32> = Producer::new(8, None::<fn()>);
    let channel = producer.channel();
    let evens = channel.filter(|v| v % 2 == 0);

    let collected = Arc::new(Mutex::new(Vec::new()));
    let collected_for_closure = Arc::clone(&collected);
    let _handler = evens.subscribe(Executor::Immediate, move |event, _from| {
        if let HandlerEvent::Update(value) = event {
            collected_for_closure.lock().unwrap().push(value);
        }
    });

    for value in 1..=6 {
        producer.send(value, None);
    }

    assert_eq!(*collected.lock().unwrap(), vec![2, 4, 6]);
}

#[test]
fn channel_distinct_until_changed_drops_consecutive_duplicates() {
    let producer: Producer<u32> = Producer::new(8, None::<fn()>);
    let channel = producer.channel();
    let distinct = channel.distinct_until_changed();

    let collected = Arc::new(Mutex::new(Vec::new()));
    let collected_for_closure = Arc::clone(&collected);
    let _handler = distinct.subscribe(Executor::Immediate, move |event, _from| {
        if let HandlerEvent::Update(value) = event {
            collected_for_closure.lock().unwrap().push(value);
        }
    });

    for value in [1, 1, 2, 2, 2, 3, 1] {
        producer.send(value, None);
    }

    assert_eq!(*collected.lock().unwrap(), vec![1, 2, 3, 1]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn channel_debounce_emits_only_the_last_value_after_a_quiet_period() {
    let producer: Producer<u32> = Producer::new(8, None::<fn()>);
    let channel = producer.channel();
    let debounced = channel.debounce(Executor::Primary, Duration::from_millis(30));

    let collected = Arc::new(Mutex::new(Vec::new()));
    let collected_for_closure = Arc::clone(&collected);
    let _handler = debounced.subscribe(Executor::Immediate, move |event, _from| {
        if let HandlerEvent::Update(value) = event {
            collected_for_closure.lock().unwrap().push(value);
        }
    });

    producer.send(1, None);
    producer.send(2, None);
    producer.send(3, None);

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(*collected.lock().unwrap(), vec![3]);
}
