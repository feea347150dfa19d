// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::time::Duration;

use asyncflow_core::{future_with_context, AsyncFlowError, Executor, Fallible, StandardExecutionContext};

#[test]
fn context_death_before_dispatch_fails_with_context_deallocated() {
    let context = StandardExecutionContext::new(Executor::Immediate);
    let weak = context.downgrade();

    drop(context);

    let future = future_with_context::<u32, AsyncFlowError, _>(&weak, |_ctx| Fallible::success(7));

    let result = future.wait(Some(Duration::from_millis(200)));
    assert!(matches!(
        result.as_deref(),
        Some(Fallible::Failure(AsyncFlowError::ContextDeallocated))
    ));
}

#[test]
fn alive_context_runs_construction_block() {
    let context = StandardExecutionContext::new(Executor::Immediate);
    let weak = context.downgrade();

    let future = future_with_context::<u32, AsyncFlowError, _>(&weak, |_ctx| Fallible::success(7));

    let result = future.wait(Some(Duration::from_millis(200)));
    assert!(matches!(result.as_deref(), Some(Fallible::Success(7))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn context_death_while_dispatch_in_flight_fails_with_context_deallocated() {
    let context = StandardExecutionContext::new(Executor::Primary);
    let weak = context.downgrade();

    let future = future_with_context::<u32, AsyncFlowError, _>(&weak, |_ctx| {
        std::thread::sleep(Duration::from_millis(150));
        Fallible::success(1)
    });

    // Give the construction task a moment to start and register itself as
    // a dependent before the context dies out from under it.
    tokio::time::sleep(Duration::from_millis(20)).await;
    drop(context);

    let result = tokio::task::spawn_blocking(move || future.wait(Some(Duration::from_secs(2))))
        .await
        .unwrap();
    assert!(matches!(
        result.as_deref(),
        Some(Fallible::Failure(AsyncFlowError::ContextDeallocated))
    ));
}
