// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `map`: transforms every success value, forwarding failures unchanged.

use std::sync::Arc;

use asyncflow_core::{Channel, Executor, Future, HandlerEvent, Producer, Promise};

/// Extension trait providing `map` for `Future`.
pub trait FutureMapExt<T, E> {
    fn map<U>(&self, transform: impl FnMut(T) -> U + Send + 'static) -> Future<U, E>
    where
        U: Send + Sync + 'static;
}

impl<T, E> FutureMapExt<T, E> for Future<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn map<U>(&self, mut transform: impl FnMut(T) -> U + Send + 'static) -> Future<U, E>
    where
        U: Send + Sync + 'static,
    {
        let promise = Promise::<U, E>::new(None::<fn()>);
        let downstream = promise.clone();

        let handler = self.subscribe(Executor::Immediate, move |value, from| {
            let mapped = (*value).clone().lift_success(&mut transform);
            downstream.try_complete(mapped, Some(from));
        });
        handler.retain_owner(Arc::new(self.clone()));
        promise.retain_until_complete(Arc::new(handler));

        promise.future()
    }
}

/// Extension trait providing `map` for `Channel`.
pub trait ChannelMapExt<T, E> {
    fn map<U>(&self, transform: impl FnMut(T) -> U + Send + 'static) -> Channel<U, E>
    where
        U: Clone + Send + Sync + 'static;
}

impl<T, E> ChannelMapExt<T, E> for Channel<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn map<U>(&self, mut transform: impl FnMut(T) -> U + Send + 'static) -> Channel<U, E>
    where
        U: Clone + Send + Sync + 'static,
    {
        let producer = Producer::<U, E>::new(self.capacity(), None::<fn()>);
        let downstream = producer.clone();

        let handler = self.subscribe(Executor::Immediate, move |event, from| match event {
            HandlerEvent::Update(value) => {
                downstream.send(transform(value), Some(from));
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
