// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::sync::{Arc, Mutex};

use asyncflow_core::{AsyncFlowError, Executor, ProducerProxy};
use asyncflow_test_utils::EventRecorder;

#[test]
fn set_forwards_to_downstream_and_to_channel() {
    let downstream_calls: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));
    let downstream_calls_for_closure = Arc::clone(&downstream_calls);

    let proxy: ProducerProxy<u32> = ProducerProxy::new(4, move |value| {
        downstream_calls_for_closure.lock().unwrap().push(value);
    });

    let recorder = EventRecorder::<u32, AsyncFlowError>::new();
    let _handler = proxy.subscribe(Executor::Immediate, recorder.callback());

    proxy.set(10);

    assert_eq!(*downstream_calls.lock().unwrap(), vec![10]);
    assert_eq!(recorder.len(), 1);
}

#[test]
fn try_update_without_handling_does_not_reinvoke_downstream_setter() {
    let downstream_calls: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));
    let downstream_calls_for_closure = Arc::clone(&downstream_calls);

    let proxy: ProducerProxy<u32> = ProducerProxy::new(4, move |value| {
        downstream_calls_for_closure.lock().unwrap().push(value);
    });

    let recorder = EventRecorder::<u32, AsyncFlowError>::new();
    let _handler = proxy.subscribe(Executor::Immediate, recorder.callback());

    let accepted = proxy.try_update_without_handling(20);

    assert!(accepted);
    assert!(
        downstream_calls.lock().unwrap().is_empty(),
        "feeding a downstream-originated value back must not re-invoke the downstream setter"
    );
    assert_eq!(recorder.len(), 1, "the channel side still observes the update");
}
