// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Future/Promise (component F): a single asynchronous value, completed at
//! most once, delivered to every subscriber exactly once — including
//! subscribers that arrive after completion.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::cancellation_token::Cancellable;
use crate::error::{AsyncFlowError, FlowError};
use crate::executor::Executor;
use crate::fallible::Fallible;
use crate::handler::{Handler, HandlerEvent, WeakHandler};
use crate::head::AtomicHead;
use crate::release_pool::ReleasePool;

enum FutureHead<T, E> {
    Initial,
    Subscribed(Vec<WeakHandler<T, E>>),
    Completed(Arc<Fallible<T, E>>),
}

struct PromiseInner<T, E> {
    head: AtomicHead<FutureHead<T, E>>,
    lazy_start: Mutex<Option<Box<dyn FnOnce() + Send>>>,
    release_pool: ReleasePool,
    wait_gate: Mutex<()>,
    wait_condvar: Condvar,
}

/// The write side: completes the shared value at most once.
pub struct Promise<T, E = AsyncFlowError> {
    inner: Arc<PromiseInner<T, E>>,
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// The read side: subscribes to, or blocks waiting for, the shared value.
/// Shares the same underlying state as the `Promise` it was produced from;
/// it simply omits the write API.
pub struct Future<T, E = AsyncFlowError> {
    inner: Arc<PromiseInner<T, E>>,
}

impl<T, E> Clone for Future<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E> Promise<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Creates a promise. `lazy_start`, if given, runs exactly once — when
    /// the first subscriber arrives, not at construction time.
    pub fn new(lazy_start: Option<impl FnOnce() + Send + 'static>) -> Self {
        Self {
            inner: Arc::new(PromiseInner {
                head: AtomicHead::new(FutureHead::Initial),
                lazy_start: Mutex::new(lazy_start.map(|f| Box::new(f) as Box<dyn FnOnce() + Send>)),
                release_pool: ReleasePool::new(),
                wait_gate: Mutex::new(()),
                wait_condvar: Condvar::new(),
            }),
        }
    }

    /// A read-only view sharing this promise's state.
    pub fn future(&self) -> Future<T, E> {
        Future {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Number of `Promise`/`Future` handles currently sharing this state.
    /// Diagnostic only; not part of the completion protocol.
    pub fn shared_handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Keeps `keep_alive` alive until this promise completes. Used to retain
    /// an upstream producer for the lifetime of a derived future.
    pub fn retain_until_complete(&self, keep_alive: Arc<dyn std::any::Any + Send + Sync>) {
        self.inner.release_pool.insert(keep_alive);
    }

    /// Completes the promise with `value`, unless it is already completed.
    /// `from` names the executor the caller is running on, for inline
    /// delivery eligibility. Returns whether this call performed the
    /// completion.
    pub fn try_complete(&self, value: Fallible<T, E>, from: Option<Executor>) -> bool {
        let value = Arc::new(value);
        let value_for_closure = Arc::clone(&value);

        let (old, _new) = self.inner.head.update_head(move |current| match &**current {
            FutureHead::Completed(_) => Arc::clone(current),
            _ => Arc::new(FutureHead::Completed(Arc::clone(&value_for_closure))),
        });

        let transitioned = match &*old {
            FutureHead::Completed(_) => false,
            FutureHead::Initial => true,
            FutureHead::Subscribed(handlers) => {
                for weak in handlers {
                    if let Some(handler) = weak.upgrade() {
                        handler.dispatch(
                            HandlerEvent::Completion(Arc::clone(&value)),
                            from.clone().unwrap_or(Executor::Immediate),
                        );
                        handler.clear_owner_backref();
                    }
                }
                true
            }
        };

        if transitioned {
            self.inner.release_pool.drain();
            let _guard = self.inner.wait_gate.lock();
            self.inner.wait_condvar.notify_all();
        }

        transitioned
    }

    /// Forwards `source`'s completion into this promise. Retains `source`
    /// until delivery, so the caller may drop its own reference immediately.
    pub fn complete_with(&self, source: &Future<T, E>)
    where
        T: Clone,
        E: Clone,
    {
        let destination = self.clone();
        let handler = source.subscribe_raw(Executor::Immediate, move |event, from| {
            if let HandlerEvent::Completion(value) = event {
                destination.try_complete((*value).clone(), Some(from));
            }
        });
        self.retain_until_complete(Arc::new(handler));
    }
}

impl<T, E> Promise<T, E>
where
    T: Send + Sync + 'static,
    E: FlowError,
{
    pub fn cancel_with_flow_error(&self) {
        self.try_complete(Fallible::Failure(E::cancelled()), None);
    }
}

impl<T, E> Cancellable for Promise<T, E>
where
    T: Send + Sync + 'static,
    E: FlowError,
{
    fn cancel(&self) {
        self.cancel_with_flow_error();
    }
}

impl<T, E> Future<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Subscribes for the single completion event. Returns the handler the
    /// caller must keep alive to stay subscribed.
    pub fn subscribe(
        &self,
        executor: Executor,
        mut on_complete: impl FnMut(Arc<Fallible<T, E>>, Executor) + Send + 'static,
    ) -> Handler<T, E> {
        self.subscribe_raw(executor, move |event, from| {
            if let HandlerEvent::Completion(value) = event {
                on_complete(value, from);
            }
        })
    }

    fn subscribe_raw(
        &self,
        executor: Executor,
        callback: impl FnMut(HandlerEvent<T, E>, Executor) + Send + 'static,
    ) -> Handler<T, E> {
        let handler = Handler::new(executor.clone(), callback);
        let weak = handler.downgrade();

        let (old, _new) = self.inner.head.update_head(|current| match &**current {
            FutureHead::Completed(_) => Arc::clone(current),
            FutureHead::Initial => Arc::new(FutureHead::Subscribed(vec![weak.clone()])),
            FutureHead::Subscribed(existing) => {
                let mut next = existing.clone();
                next.push(weak.clone());
                Arc::new(FutureHead::Subscribed(next))
            }
        });

        match &*old {
            FutureHead::Completed(value) => {
                handler.dispatch(HandlerEvent::Completion(Arc::clone(value)), executor);
            }
            FutureHead::Initial => {
                if let Some(notifier) = self.inner.lazy_start.lock().take() {
                    notifier();
                }
            }
            FutureHead::Subscribed(_) => {}
        }

        handler
    }

    pub fn is_completed(&self) -> bool {
        matches!(&*self.inner.head.load(), FutureHead::Completed(_))
    }

    /// Number of `Promise`/`Future` handles currently sharing this state.
    /// Diagnostic only; not part of the completion protocol.
    pub fn shared_handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Blocks the calling thread until the future completes or `timeout`
    /// elapses, whichever comes first. Returns `None` on timeout.
    ///
    /// This is the one place in the core that uses a blocking
    /// `std::sync::`-style mutex/condvar pair instead of the lock-free head:
    /// a short, uncontended rendezvous that the lock-free fast path (used by
    /// `subscribe`/`try_complete`) doesn't need to serve.
    pub fn wait(&self, timeout: Option<Duration>) -> Option<Arc<Fallible<T, E>>> {
        if let FutureHead::Completed(value) = &*self.inner.head.load() {
            return Some(Arc::clone(value));
        }

        let mut guard = self.inner.wait_gate.lock();
        loop {
            if let FutureHead::Completed(value) = &*self.inner.head.load() {
                return Some(Arc::clone(value));
            }
            let timed_out = match timeout {
                Some(duration) => self.inner.wait_condvar.wait_for(&mut guard, duration).timed_out(),
                None => {
                    self.inner.wait_condvar.wait(&mut guard);
                    false
                }
            };
            if timed_out {
                return match &*self.inner.head.load() {
                    FutureHead::Completed(value) => Some(Arc::clone(value)),
                    _ => None,
                };
            }
        }
    }
}
