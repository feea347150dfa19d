// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Internal glue from `Executor::Primary`/`Priority`/delayed dispatch onto
//! whichever async runtime feature is enabled. Kept deliberately thin: the
//! richer timer/mutex abstraction lives in `asyncflow-runtime`, consumed by
//! `asyncflow-exec`; this module only needs "spawn a task" and "spawn a task
//! after a delay" for the core's own `Executor` variants.

use std::time::Duration;

use crate::executor::{Executor, PriorityLane};

type BoxedTask = Box<dyn FnOnce() + Send>;

pub(crate) fn spawn_primary(task: BoxedTask) {
    spawn(task);
}

pub(crate) fn spawn_priority(_lane: PriorityLane, task: BoxedTask) {
    // Priority lanes select a scheduling hint on platforms that expose one;
    // the primary executors wired up today run everything on one pool.
    spawn(task);
}

pub(crate) fn spawn_after(executor: Executor, delay: Duration, task: BoxedTask) {
    #[cfg(feature = "runtime-tokio")]
    {
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            executor.execute(None, move |_| task());
        });
        return;
    }

    #[cfg(all(not(feature = "runtime-tokio"), feature = "runtime-smol"))]
    {
        smol::spawn(async move {
            smol::Timer::after(delay).await;
            executor.execute(None, move |_| task());
        })
        .detach();
        return;
    }

    #[cfg(all(
        not(feature = "runtime-tokio"),
        not(feature = "runtime-smol"),
        feature = "runtime-async-std"
    ))]
    {
        async_std::task::spawn(async move {
            async_std::task::sleep(delay).await;
            executor.execute(None, move |_| task());
        });
        return;
    }

    #[cfg(not(any(
        feature = "runtime-tokio",
        feature = "runtime-smol",
        feature = "runtime-async-std"
    )))]
    {
        std::thread::spawn(move || {
            std::thread::sleep(delay);
            executor.execute(None, move |_| task());
        });
    }
}

fn spawn(task: BoxedTask) {
    #[cfg(feature = "runtime-tokio")]
    {
        tokio::task::spawn_blocking(task);
        return;
    }

    #[cfg(all(not(feature = "runtime-tokio"), feature = "runtime-smol"))]
    {
        smol::spawn(async move { task() }).detach();
        return;
    }

    #[cfg(all(
        not(feature = "runtime-tokio"),
        not(feature = "runtime-smol"),
        feature = "runtime-async-std"
    ))]
    {
        async_std::task::spawn(async move { task() });
        return;
    }

    #[cfg(target_arch = "wasm32")]
    {
        // wasm is single-threaded; run inline rather than fail to spawn.
        task();
        return;
    }

    #[cfg(not(any(
        feature = "runtime-tokio",
        feature = "runtime-smol",
        feature = "runtime-async-std",
        target_arch = "wasm32"
    )))]
    {
        std::thread::spawn(task);
    }
}
