// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::sync::Arc;
use std::time::{Duration, Instant};

use asyncflow_core::{Executor, Fallible, HandlerEvent};
use parking_lot::{Condvar, Mutex};

/// One event recorded by a collecting handler, owned so tests can assert on
/// it after the subscription is done.
///
/// `Completion` never carries the real completed value — `Channel`'s
/// completion never has one, and no test here needs to inspect `Future`'s —
/// so both `callback()` and `future_callback()` erase it to `Fallible<(), E>`.
pub enum RecordedEvent<T, E> {
    Update(T),
    Completion(Arc<Fallible<(), E>>),
}

struct RecorderState<T, E> {
    events: Mutex<Vec<RecordedEvent<T, E>>>,
    condvar: Condvar,
}

/// Collects every event delivered to a handler, for assertion from a test's
/// main thread regardless of which executor actually ran the callback.
pub struct EventRecorder<T, E> {
    state: Arc<RecorderState<T, E>>,
}

impl<T, E> Default for EventRecorder<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> EventRecorder<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            state: Arc::new(RecorderState {
                events: Mutex::new(Vec::new()),
                condvar: Condvar::new(),
            }),
        }
    }

    /// A callback suitable for `Channel::subscribe` (and anything else built
    /// on the `HandlerEvent<T, E, ()>` shape, e.g. `ProducerProxy::subscribe`).
    pub fn callback(&self) -> impl FnMut(HandlerEvent<T, E, ()>, Executor) + Send + 'static {
        let state = Arc::clone(&self.state);
        move |event, _executor| {
            let recorded = match event {
                HandlerEvent::Update(value) => RecordedEvent::Update(value),
                HandlerEvent::Completion(value) => RecordedEvent::Completion(value),
            };
            let mut guard = state.events.lock();
            guard.push(recorded);
            state.condvar.notify_all();
        }
    }

    /// A callback suitable for `Future::subscribe`, which delivers the
    /// completed value directly rather than through a `HandlerEvent`.
    pub fn future_callback(&self) -> impl FnMut(Arc<Fallible<T, E>>, Executor) + Send + 'static
    where
        E: Clone,
    {
        let state = Arc::clone(&self.state);
        move |value, _executor| {
            let erased = match &*value {
                Fallible::Success(_) => Fallible::Success(()),
                Fallible::Failure(e) => Fallible::Failure(e.clone()),
            };
            let mut guard = state.events.lock();
            guard.push(RecordedEvent::Completion(Arc::new(erased)));
            state.condvar.notify_all();
        }
    }

    /// Blocks the calling thread until at least `count` events have been
    /// recorded, or `timeout` elapses. Returns whether the count was
    /// reached.
    pub fn wait_for_count(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut guard = self.state.events.lock();
        while guard.len() < count {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return guard.len() >= count;
            }
            self.state.condvar.wait_for(&mut guard, remaining);
        }
        true
    }

    pub fn len(&self) -> usize {
        self.state.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn take(&self) -> Vec<RecordedEvent<T, E>> {
        std::mem::take(&mut *self.state.events.lock())
    }
}

/// Asserts that an `EventRecorder` receives nothing within `timeout`.
///
/// # Panics
/// Panics if an event is recorded before the timeout elapses.
pub fn assert_no_event_recorded<T, E>(recorder: &EventRecorder<T, E>, timeout: Duration)
where
    T: Send + 'static,
    E: Send + 'static,
{
    assert!(
        !recorder.wait_for_count(1, timeout),
        "expected no event within {timeout:?}, but one was recorded"
    );
}

/// Polls `condition` until it returns `true` or `timeout` elapses.
///
/// # Panics
/// Panics if `condition` never returns `true` within the timeout.
pub fn wait_until(mut condition: impl FnMut() -> bool, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return;
        }
        assert!(Instant::now() < deadline, "condition not met within {timeout:?}");
        std::thread::sleep(Duration::from_millis(5));
    }
}

/// Wraps an async test body with a fixed timeout, so a hung test fails fast
/// instead of stalling CI.
#[macro_export]
macro_rules! with_timeout {
    ($test_body:expr) => {
        tokio::time::timeout(std::time::Duration::from_secs(5), async { $test_body })
            .await
            .expect("test timed out after 5 seconds")
    };
}
