// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::time::Duration;

use asyncflow_core::{AsyncFlowError, Fallible, Promise};

#[test]
fn complete_with_forwards_source_completion_to_destination() {
    let source: Promise<u32> = Promise::new(None::<fn()>);
    let destination: Promise<u32> = Promise::new(None::<fn()>);

    destination.complete_with(&source.future());
    source.try_complete(Fallible::success(5), None);

    let result = destination.future().wait(Some(Duration::from_millis(200)));
    assert!(matches!(result.as_deref(), Some(Fallible::Success(5))));
}

#[test]
fn complete_with_on_already_completed_source_delivers_immediately() {
    let source: Promise<u32> = Promise::new(None::<fn()>);
    source.try_complete(Fallible::success(9), None);

    let destination: Promise<u32> = Promise::new(None::<fn()>);
    destination.complete_with(&source.future());

    let result = destination.future().wait(Some(Duration::from_millis(200)));
    assert!(matches!(result.as_deref(), Some(Fallible::Success(9))));
}

#[test]
fn second_try_complete_after_chaining_is_a_no_op() {
    let source: Promise<u32> = Promise::new(None::<fn()>);
    let destination: Promise<u32> = Promise::new(None::<fn()>);
    destination.complete_with(&source.future());

    source.try_complete(Fallible::success(1), None);
    let second = destination.try_complete(Fallible::success(2), None);

    assert!(!second, "destination was already completed by the chained source");
    let result = destination.future().wait(Some(Duration::from_millis(200)));
    assert!(matches!(result.as_deref(), Some(Fallible::Success(1))));
}

#[allow(dead_code)]
fn silence_unused_error_import(_: AsyncFlowError) {}
