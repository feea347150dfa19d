// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The handler record (component I): `{executor, block, owner_backref}`,
//! shared by both `Future`/`Promise` completion delivery and
//! `Channel`/`Producer` update/completion delivery.
//!
//! The producer side of a subscription only ever holds a *weak* reference
//! to a handler (via [`WeakHandler`]); the consumer side holds the only
//! strong reference, returned from `subscribe()` as [`Handler`]. Dropping
//! that strong reference before completion unsubscribes: the next walk over
//! the subscriber list upgrades a dead weak slot to `None` and simply skips
//! it.

use std::any::Any;
use std::sync::Arc;
use std::sync::Weak;

use parking_lot::Mutex;

use crate::error::AsyncFlowError;
use crate::executor::Executor;
use crate::fallible::Fallible;

/// A single notification delivered to a handler's block.
///
/// `C` is the completion payload's success type, independent of `T` (the
/// update payload type): a `Future`/`Promise` handler has `C = T` (its
/// single completion delivers the completed value), while a
/// `Channel`/`Producer` handler has `C = ()` (its completion is a terminal
/// signal, carrying no value of its own).
pub enum HandlerEvent<T, E = AsyncFlowError, C = T> {
    /// A `Channel` update. Never produced for a `Future`/`Promise`.
    Update(T),
    /// Terminal delivery for both `Future` (carries the completion value)
    /// and `Channel` (carries `Fallible<(), E>`).
    Completion(Arc<Fallible<C, E>>),
}

type Callback<T, E, C> = Box<dyn FnMut(HandlerEvent<T, E, C>, Executor) + Send>;

struct HandlerState<T, E, C> {
    executor: Executor,
    callback: Mutex<Option<Callback<T, E, C>>>,
    /// Strong reference the handler keeps alive until its terminal
    /// delivery, then drops. Used by chained completions (e.g.
    /// `Promise::complete_with`) to keep a source alive without creating a
    /// permanent reference cycle.
    owner_backref: Mutex<Option<Arc<dyn Any + Send + Sync>>>,
}

/// The strong, consumer-held side of a subscription. Disposing it (dropping
/// the last clone) unsubscribes.
#[derive(Clone)]
pub struct Handler<T, E = AsyncFlowError, C = T> {
    state: Arc<HandlerState<T, E, C>>,
}

/// The weak, producer-held side of a subscription, stored in a head's
/// subscriber list.
#[derive(Clone)]
pub struct WeakHandler<T, E = AsyncFlowError, C = T> {
    state: Weak<HandlerState<T, E, C>>,
}

impl<T, E, C> Handler<T, E, C>
where
    T: Send + 'static,
    E: Send + 'static,
    C: Send + 'static,
{
    pub fn new(executor: Executor, callback: impl FnMut(HandlerEvent<T, E, C>, Executor) + Send + 'static) -> Self {
        Self {
            state: Arc::new(HandlerState {
                executor,
                callback: Mutex::new(Some(Box::new(callback))),
                owner_backref: Mutex::new(None),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakHandler<T, E, C> {
        WeakHandler {
            state: Arc::downgrade(&self.state),
        }
    }

    pub fn executor(&self) -> Executor {
        self.state.executor.clone()
    }

    /// Retains `owner`, keeping it alive until this handler's terminal
    /// delivery clears the slot. Used when a completion must keep its
    /// source (or destination) alive without the producer holding a
    /// permanent strong reference back.
    pub fn retain_owner(&self, owner: Arc<dyn Any + Send + Sync>) {
        *self.state.owner_backref.lock() = Some(owner);
    }

    pub(crate) fn clear_owner_backref(&self) {
        self.state.owner_backref.lock().take();
    }

    /// Delivers `event`, scheduling through this handler's executor and
    /// respecting the inline-delivery rules of [`Executor::execute`].
    pub(crate) fn dispatch(&self, event: HandlerEvent<T, E, C>, from: Executor) {
        let state = Arc::clone(&self.state);
        state.executor.clone().execute(Some(&from), move |origin| {
            let mut slot = state.callback.lock();
            if let Some(cb) = slot.as_mut() {
                cb(event, origin);
            }
        });
    }
}

impl<T, E, C> WeakHandler<T, E, C> {
    pub(crate) fn upgrade(&self) -> Option<Handler<T, E, C>> {
        self.state.upgrade().map(|state| Handler { state })
    }
}
