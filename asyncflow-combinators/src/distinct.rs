// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `distinct_until_changed`: suppresses consecutive duplicate updates. The
//! first update is always forwarded; completion always forwards unchanged.

use std::sync::Arc;

use parking_lot::Mutex;

use asyncflow_core::{Channel, Executor, HandlerEvent, Producer};

pub trait ChannelDistinctExt<T, E> {
    fn distinct_until_changed(&self) -> Channel<T, E>;
}

impl<T, E> ChannelDistinctExt<T, E> for Channel<T, E>
where
    T: Clone + PartialEq + Send + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn distinct_until_changed(&self) -> Channel<T, E> {
        let producer = Producer::<T, E>::new(self.capacity(), None::<fn()>);
        let downstream = producer.clone();
        let last: Arc<Mutex<Option<T>>> = Arc::new(Mutex::new(None));

        let handler = self.subscribe(Executor::Immediate, move |event, from| match event {
            HandlerEvent::Update(value) => {
                let mut last = last.lock();
                let changed = last.as_ref() != Some(&value);
                if changed {
                    *last = Some(value.clone());
                    drop(last);
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
