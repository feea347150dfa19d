// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `debounce`: emits the latest update only after a pause of at least
//! `duration` with no further updates. A generation counter stands in for
//! cancelling a scheduled timer (the push-based `Executor` has no handle to
//! cancel a pending `execute_after` call): each update bumps the counter and
//! schedules a check that only fires if no later update has arrived by then.
//! Errors and the terminal completion pass through immediately, flushing any
//! pending value first.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use asyncflow_core::{Channel, Executor, Fallible, HandlerEvent, Producer};

struct DebounceState<T> {
    pending: Mutex<Option<T>>,
    generation: AtomicU64,
}

pub trait ChannelDebounceExt<T, E> {
    fn debounce(&self, executor: Executor, duration: Duration) -> Channel<T, E>;
}

impl<T, E> ChannelDebounceExt<T, E> for Channel<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn debounce(&self, executor: Executor, duration: Duration) -> Channel<T, E> {
        let producer = Producer::<T, E>::new(self.capacity(), None::<fn()>);
        let downstream = producer.clone();
        let state = Arc::new(DebounceState {
            pending: Mutex::new(None),
            generation: AtomicU64::new(0),
        });

        let handler = self.subscribe(Executor::Immediate, move |event, from| match event {
            HandlerEvent::Update(value) => {
                *state.pending.lock() = Some(value);
                let my_generation = state.generation.fetch_add(1, Ordering::AcqRel) + 1;

                let state = Arc::clone(&state);
                let downstream = downstream.clone();
                executor.execute_after(duration, move |from| {
                    if state.generation.load(Ordering::Acquire) != my_generation {
                        return;
                    }
                    if let Some(value) = state.pending.lock().take() {
                        downstream.send(value, Some(from));
                    }
                });
            }
            HandlerEvent::Completion(result) => {
                if let Some(value) = state.pending.lock().take() {
                    downstream.send(value, Some(from.clone()));
                }
                downstream.complete((*result).clone(), Some(from));
            }
        });
        handler.retain_owner(Arc::new(self.clone()));
        producer.retain_until_complete(Arc::new(handler));

        producer.channel()
    }
}
