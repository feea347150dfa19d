// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Execution contexts (component H): a bounded-lifetime host binding.
//! Dependents registered on a context fail with `contextDeallocated` when
//! the context's last strong reference is dropped, and construction blocks
//! run against a context built from a weak reference fail the same way if
//! the context has already died by dispatch time.
//!
//! This is deliberately a different failure kind, and a different
//! registration list, from [`crate::CancellationToken`]: a token's
//! `cancel()` is an explicit signal producing `Cancelled`, while a context's
//! death is implicit (ordinary `Drop`) and produces `ContextDeallocated`.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::error::FlowError;
use crate::executor::Executor;
use crate::fallible::Fallible;
use crate::future::{Future, Promise};

/// Anything an `ExecutionContext` can fail on the context's behalf when the
/// context dies. Distinct from `Cancellable`, which backs explicit
/// `CancellationToken` cancellation instead.
pub trait ContextDependent: Send + Sync {
    fn fail_context_deallocated(&self);
}

/// The interface a bound construction block sees: the context's executor,
/// and a way to register a dependent so it fails if the context dies.
pub trait ExecutionContext: Send + Sync {
    fn executor(&self) -> Executor;
    fn add_dependent(&self, dependent: Arc<dyn ContextDependent>);
}

struct ContextState {
    executor: Executor,
    dependents: Mutex<Vec<Weak<dyn ContextDependent>>>,
}

impl Drop for ContextState {
    fn drop(&mut self) {
        let dependents = std::mem::take(&mut *self.dependents.lock());
        for dependent in dependents {
            if let Some(dependent) = dependent.upgrade() {
                dependent.fail_context_deallocated();
            }
        }
    }
}

/// The concrete, reference-counted `ExecutionContext` this crate ships.
/// Typically held strongly by a host object and handed out as
/// [`StandardExecutionContext::downgrade`] to anything that should not
/// extend the host's lifetime.
#[derive(Clone)]
pub struct StandardExecutionContext {
    state: Arc<ContextState>,
}

impl StandardExecutionContext {
    pub fn new(executor: Executor) -> Self {
        Self {
            state: Arc::new(ContextState {
                executor,
                dependents: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakExecutionContext {
        WeakExecutionContext {
            state: Arc::downgrade(&self.state),
        }
    }
}

impl ExecutionContext for StandardExecutionContext {
    fn executor(&self) -> Executor {
        self.state.executor.clone()
    }

    fn add_dependent(&self, dependent: Arc<dyn ContextDependent>) {
        self.state.dependents.lock().push(Arc::downgrade(&dependent));
    }
}

/// A weak handle to a [`StandardExecutionContext`], the form construction
/// blocks are bound against so they never keep the host alive.
#[derive(Clone)]
pub struct WeakExecutionContext {
    state: Weak<ContextState>,
}

impl WeakExecutionContext {
    pub fn upgrade(&self) -> Option<StandardExecutionContext> {
        self.state.upgrade().map(|state| StandardExecutionContext { state })
    }
}

impl<T, E> ContextDependent for Promise<T, E>
where
    T: Send + Sync + 'static,
    E: FlowError,
{
    fn fail_context_deallocated(&self) {
        self.try_complete(Fallible::Failure(E::context_deallocated()), None);
    }
}

/// Builds a `Future` whose value is produced by `construct`, run on the
/// context's executor if the context is still alive at dispatch time. If the
/// context has already died, the future completes immediately with
/// `E::context_deallocated()` and `construct` never runs. If the context
/// dies after dispatch but before `construct` completes it, the future
/// fails the same way.
pub fn future_with_context<T, E, F>(context: &WeakExecutionContext, construct: F) -> Future<T, E>
where
    T: Send + Sync + 'static,
    E: FlowError,
    F: FnOnce(StandardExecutionContext) -> Fallible<T, E> + Send + 'static,
{
    let promise = Promise::<T, E>::new(None::<fn()>);
    let future = promise.future();

    match context.upgrade() {
        Some(ctx) => {
            ctx.add_dependent(Arc::new(promise.clone()) as Arc<dyn ContextDependent>);
            let executor = ctx.executor();
            let dispatch_promise = promise.clone();
            executor.execute(None, move |_| {
                let result = construct(ctx);
                dispatch_promise.try_complete(result, None);
            });
        }
        None => {
            promise.try_complete(Fallible::Failure(E::context_deallocated()), None);
        }
    }

    future
}
