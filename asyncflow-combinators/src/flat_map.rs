// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `flat_map`: chains a `Future` into another `Future` built from its success
//! value. A source failure propagates directly; `transform` never runs.

use std::sync::Arc;

use asyncflow_core::{Executor, Fallible, Future, Promise};

pub trait FutureFlatMapExt<T, E> {
    fn flat_map<U>(&self, transform: impl FnOnce(T) -> Future<U, E> + Send + 'static) -> Future<U, E>
    where
        U: Send + Sync + 'static;
}

impl<T, E> FutureFlatMapExt<T, E> for Future<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn flat_map<U>(&self, transform: impl FnOnce(T) -> Future<U, E> + Send + 'static) -> Future<U, E>
    where
        U: Send + Sync + 'static,
    {
        let promise = Promise::<U, E>::new(None::<fn()>);
        let downstream = promise.clone();
        let mut transform = Some(transform);

        let handler = self.subscribe(Executor::Immediate, move |value, from| match &*value {
            Fallible::Success(v) => {
                if let Some(transform) = transform.take() {
                    let inner = transform(v.clone());
                    downstream.complete_with(&inner);
                }
            }
            Fallible::Failure(error) => {
                downstream.try_complete(Fallible::Failure(error.clone()), Some(from));
            }
        });
        handler.retain_owner(Arc::new(self.clone()));
        promise.retain_until_complete(Arc::new(handler));

        promise.future()
    }
}
