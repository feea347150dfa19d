// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `future(after:)`: a future that completes after a delay, on a given
//! executor. Thin sugar over [`Executor::execute_after`] plus a `Promise` —
//! the delay/timer plumbing itself lives in `asyncflow-runtime` and
//! `asyncflow-core::runtime_dispatch`, not here.

use asyncflow_core::{AsyncFlowError, CancellationToken, Executor, Fallible, FlowError, Future};
use std::sync::Arc;
use std::time::Duration;

/// Builds a future that runs `construct` on `executor` after `delay`, then
/// completes with its result. `construct` never runs if the caller drops
/// every handle to the returned future before the delay elapses — the
/// executor still runs it, but nothing observes the result.
///
/// If `token` is given, it is registered against the promise before the
/// delayed dispatch is scheduled: a token already cancelled completes the
/// future with the `cancelled` failure immediately, and a token cancelled
/// before `construct` runs preempts it the same way.
pub fn future_after<T, E, F>(
    executor: Executor,
    delay: Duration,
    token: Option<&CancellationToken>,
    construct: F,
) -> Future<T, E>
where
    T: Send + Sync + 'static,
    E: FlowError,
    F: FnOnce() -> Fallible<T, E> + Send + 'static,
{
    let promise = asyncflow_core::Promise::<T, E>::new(None::<fn()>);
    let future = promise.future();

    if let Some(token) = token {
        token.add(Arc::new(promise.clone()));
    }

    executor.execute_after(delay, move |from| {
        let result = construct();
        promise.try_complete(result, Some(from));
    });

    future
}

/// Convenience alias for the common case of `E = AsyncFlowError`.
pub fn future_after_value<T>(
    executor: Executor,
    delay: Duration,
    token: Option<&CancellationToken>,
    value: T,
) -> Future<T, AsyncFlowError>
where
    T: Send + Sync + 'static,
{
    future_after(executor, delay, token, move || Fallible::success(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn completes_after_the_delay_with_the_constructed_value() {
        let future = future_after_value(Executor::Primary, Duration::from_millis(20), None, 42u32);

        let result = tokio::task::spawn_blocking(move || future.wait(Some(Duration::from_secs(2))))
            .await
            .unwrap();

        assert!(matches!(result.as_deref(), Some(Fallible::Success(42))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn cancelling_the_token_immediately_completes_with_cancelled() {
        let token = CancellationToken::new();
        token.cancel();

        let future = future_after_value(Executor::Primary, Duration::from_millis(100), Some(&token), 42u32);

        let result = tokio::task::spawn_blocking(move || future.wait(Some(Duration::from_secs(2))))
            .await
            .unwrap();

        assert!(matches!(result.as_deref(), Some(Fallible::Failure(e)) if e.is_cancelled()));
    }
}
