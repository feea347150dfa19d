// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `ProducerProxy` (component 4.J): a two-way `Channel` binding used to
//! bridge a channel to an external mutable property (e.g. a KVO-observed
//! host field) without feeding an update straight back into its own source.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::channel::{Channel, Producer};
use crate::error::AsyncFlowError;
use crate::executor::Executor;

/// A `Channel`/`Producer` pair with a re-entrancy guard protecting a
/// downstream setter callback from observing its own writes.
pub struct ProducerProxy<T, E = AsyncFlowError> {
    producer: Producer<T, E>,
    downstream_setter: Arc<dyn Fn(T) + Send + Sync>,
    updating_from_downstream: Arc<AtomicBool>,
}

impl<T, E> Clone for ProducerProxy<T, E> {
    fn clone(&self) -> Self {
        Self {
            producer: self.producer.clone(),
            downstream_setter: Arc::clone(&self.downstream_setter),
            updating_from_downstream: Arc::clone(&self.updating_from_downstream),
        }
    }
}

impl<T, E> ProducerProxy<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    pub fn new(buffer_capacity: usize, downstream_setter: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            producer: Producer::new(buffer_capacity, None::<fn()>),
            downstream_setter: Arc::new(downstream_setter),
            updating_from_downstream: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn channel(&self) -> Channel<T, E> {
        self.producer.channel()
    }

    /// Keeps `keep_alive` alive until the underlying channel completes.
    /// Used to retain a bridging background task for as long as the proxy
    /// itself is live.
    pub fn retain_until_complete(&self, keep_alive: Arc<dyn std::any::Any + Send + Sync>) {
        self.producer.retain_until_complete(keep_alive);
    }

    /// Sets `value` on the channel and forwards it to the downstream
    /// setter, unless this call is itself the result of a downstream
    /// update being fed back in (guarded by the re-entrancy flag).
    pub fn set(&self, value: T) {
        if !self.updating_from_downstream.load(Ordering::Acquire) {
            (self.downstream_setter)(value.clone());
        }
        self.producer.send(value, None);
    }

    /// Feeds a value observed from the downstream side back into the
    /// channel without re-invoking the downstream setter. Returns `false`
    /// if a feedback cycle was already in progress (the call is dropped
    /// rather than recursing).
    pub fn try_update_without_handling(&self, value: T) -> bool {
        if self
            .updating_from_downstream
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        let sent = self.producer.send(value, None);
        self.updating_from_downstream.store(false, Ordering::Release);
        sent
    }

    pub fn subscribe(
        &self,
        executor: Executor,
        on_event: impl FnMut(crate::handler::HandlerEvent<T, E, ()>, Executor) + Send + 'static,
    ) -> crate::handler::Handler<T, E, ()> {
        self.producer.channel().subscribe(executor, on_event)
    }
}
