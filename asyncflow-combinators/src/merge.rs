// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `merge`: interleaves updates from several channels into one, with no
//! ordering guarantee across sources (ordered multi-producer fan-in is an
//! explicit Non-goal). Completes successfully once every source has
//! completed successfully; the first source failure completes the merged
//! channel with that failure immediately.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use asyncflow_core::{Channel, Executor, Fallible, HandlerEvent, Producer};

/// Merges `sources` into a single channel. The merged channel's replay
/// capacity is the largest capacity among its sources.
pub fn merge<T, E>(sources: Vec<Channel<T, E>>) -> Channel<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + Sync + 'static,
{
    let capacity = sources.iter().map(Channel::capacity).max().unwrap_or(0);
    let producer = Producer::<T, E>::new(capacity, None::<fn()>);
    let remaining = Arc::new(AtomicUsize::new(sources.len()));

    if sources.is_empty() {
        producer.complete(Fallible::Success(()), None);
        return producer.channel();
    }

    let mut handlers = Vec::with_capacity(sources.len());
    for source in &sources {
        let downstream = producer.clone();
        let remaining = Arc::clone(&remaining);

        let handler = source.subscribe(Executor::Immediate, move |event, from| match event {
            HandlerEvent::Update(value) => {
                downstream.send(value, Some(from));
            }
            HandlerEvent::Completion(result) => match &*result {
                Fallible::Success(()) => {
                    if remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
                        downstream.complete(Fallible::Success(()), Some(from));
                    }
                }
                Fallible::Failure(error) => {
                    downstream.complete(Fallible::Failure(error.clone()), Some(from));
                }
            },
        });
        handler.retain_owner(Arc::new(source.clone()));
        handlers.push(handler);
    }

    producer.retain_until_complete(Arc::new(handlers));
    producer.channel()
}
