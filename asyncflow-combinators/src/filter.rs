// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `filter`: forwards only updates matching a predicate. Completion always
//! forwards unchanged, matching spec's propagation policy for combinators
//! that transform only the success arm.

use std::sync::Arc;

use asyncflow_core::{Channel, Executor, HandlerEvent, Producer};

pub trait ChannelFilterExt<T, E> {
    fn filter(&self, predicate: impl FnMut(&T) -> bool + Send + 'static) -> Channel<T, E>;
}

impl<T, E> ChannelFilterExt<T, E> for Channel<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn filter(&self, mut predicate: impl FnMut(&T) -> bool + Send + 'static) -> Channel<T, E> {
        let producer = Producer::<T, E>::new(self.capacity(), None::<fn()>);
        let downstream = producer.clone();

        let handler = self.subscribe(Executor::Immediate, move |event, from| match event {
            HandlerEvent::Update(value) => {
                if predicate(&value) {
                    downstream.send(value, Some(from));
                }
            }
            HandlerEvent::Completion(result) => {
                downstream.complete((*result).clone(), Some(from));
            }
        });
        handler.retain_owner(Arc::new(self.clone()));
        producer.retain_until_complete(Arc::new(handler));

        producer.channel()
    }
}
