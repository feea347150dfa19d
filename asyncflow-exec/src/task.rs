// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Runtime-agnostic background task spawning with cooperative cancellation.
//! Used internally for `Channel::from_stream`-style bridging and by anything
//! that needs a cancel-on-drop background future without going through the
//! `Executor` enum's one-shot dispatch.

use asyncflow_core::CancellationToken;
use std::future::Future;

/// A spawned background task that signals its `CancellationToken` when
/// dropped or explicitly cancelled. The task body is responsible for
/// checking the token and exiting; nothing forcibly aborts it.
#[derive(Debug)]
pub struct AsyncFlowTask {
    cancel: CancellationToken,
}

impl AsyncFlowTask {
    /// Spawns `f(token)` on the compiled-in runtime. `f` should poll
    /// `token.is_cancelled()` (or await `token.cancelled()`) and return
    /// promptly once it observes cancellation.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn spawn<F, Fut>(f: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let future = f(cancel.clone());

        #[cfg(feature = "runtime-tokio")]
        tokio::spawn(future);

        #[cfg(all(feature = "runtime-smol", not(feature = "runtime-tokio")))]
        smol::spawn(future).detach();

        #[cfg(all(
            feature = "runtime-async-std",
            not(feature = "runtime-tokio"),
            not(feature = "runtime-smol")
        ))]
        async_std::task::spawn(future);

        #[cfg(not(any(feature = "runtime-tokio", feature = "runtime-smol", feature = "runtime-async-std")))]
        {
            let _ = future;
            compile_error!("asyncflow-exec: enable one of runtime-tokio, runtime-smol, runtime-async-std");
        }

        Self { cancel }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn spawn<F, Fut>(f: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        let cancel = CancellationToken::new();
        let future = f(cancel.clone());
        wasm_bindgen_futures::spawn_local(future);
        Self { cancel }
    }

    /// Signals cancellation. Does not wait for the task to observe it.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for AsyncFlowTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(all(test, feature = "runtime-tokio"))]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn dropping_the_task_signals_cancellation() {
        let observed = Arc::new(AtomicBool::new(false));
        let observed_in_task = Arc::clone(&observed);

        let task = AsyncFlowTask::spawn(move |token| async move {
            token.cancelled().await;
            observed_in_task.store(true, Ordering::SeqCst);
        });

        drop(task);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(observed.load(Ordering::SeqCst));
    }
}
