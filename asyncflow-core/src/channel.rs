// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Channel/Producer (component G): zero or more updates followed by at most
//! one terminal completion, with a fixed-size replay buffer for subscribers
//! that arrive mid-stream.
//!
//! The replay buffer lives *inside* the same head state as the subscriber
//! list, so a single atomic swap both grows the buffer and registers a new
//! subscriber. That closes the race a separately-locked buffer would have:
//! whichever `send` wins the swap commits its value to exactly the
//! subscriber list that was current at that instant, so a subscriber sees
//! every update either in its replay snapshot or as a live delivery, never
//! both and never neither.

use std::sync::Arc;

use crate::error::{AsyncFlowError, FlowError};
use crate::executor::Executor;
use crate::fallible::Fallible;
use crate::handler::{Handler, HandlerEvent, WeakHandler};
use crate::head::AtomicHead;
use crate::release_pool::ReleasePool;
use crate::cancellation_token::Cancellable;

enum ChannelHead<T, E> {
    Initial {
        buffer: Arc<Vec<T>>,
    },
    Subscribed {
        handlers: Vec<WeakHandler<T, E, ()>>,
        buffer: Arc<Vec<T>>,
    },
    Completed {
        buffer: Arc<Vec<T>>,
        result: Arc<Fallible<(), E>>,
    },
}

impl<T, E> ChannelHead<T, E> {
    fn buffer(&self) -> &Arc<Vec<T>> {
        match self {
            Self::Initial { buffer } | Self::Subscribed { buffer, .. } | Self::Completed { buffer, .. } => buffer,
        }
    }
}

fn push_bounded<T: Clone>(existing: &Arc<Vec<T>>, value: T, capacity: usize) -> Arc<Vec<T>> {
    if capacity == 0 {
        return Arc::new(Vec::new());
    }
    let mut next: Vec<T> = if existing.len() >= capacity {
        existing[existing.len() - capacity + 1..].to_vec()
    } else {
        existing.as_ref().clone()
    };
    next.push(value);
    Arc::new(next)
}

struct ChannelInner<T, E> {
    head: AtomicHead<ChannelHead<T, E>>,
    capacity: usize,
    lazy_start: parking_lot::Mutex<Option<Box<dyn FnOnce() + Send>>>,
    release_pool: ReleasePool,
}

/// The write side: sends updates and, at most once, a terminal completion.
pub struct Producer<T, E = AsyncFlowError> {
    inner: Arc<ChannelInner<T, E>>,
}

impl<T, E> Clone for Producer<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// The read side: subscribes to updates and completion, replaying any
/// buffered backlog to new subscribers first.
pub struct Channel<T, E = AsyncFlowError> {
    inner: Arc<ChannelInner<T, E>>,
}

impl<T, E> Clone for Channel<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E> Producer<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Creates a producer with a fixed-size replay buffer. `lazy_start`, if
    /// given, runs exactly once, when the first subscriber arrives.
    pub fn new(capacity: usize, lazy_start: Option<impl FnOnce() + Send + 'static>) -> Self {
        Self {
            inner: Arc::new(ChannelInner {
                head: AtomicHead::new(ChannelHead::Initial { buffer: Arc::new(Vec::new()) }),
                capacity,
                lazy_start: parking_lot::Mutex::new(lazy_start.map(|f| Box::new(f) as Box<dyn FnOnce() + Send>)),
                release_pool: ReleasePool::new(),
            }),
        }
    }

    pub fn channel(&self) -> Channel<T, E> {
        Channel {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn retain_until_complete(&self, keep_alive: Arc<dyn std::any::Any + Send + Sync>) {
        self.inner.release_pool.insert(keep_alive);
    }

    /// Sends an update. A no-op once the channel has completed. Returns
    /// whether the update was accepted.
    pub fn send(&self, value: T, from: Option<Executor>) -> bool {
        let capacity = self.inner.capacity;
        let value_for_closure = value.clone();

        let (old, _new) = self.inner.head.update_head(move |current| match current.as_ref() {
            ChannelHead::Completed { .. } => Arc::clone(current),
            ChannelHead::Initial { buffer } => Arc::new(ChannelHead::Initial {
                buffer: push_bounded(buffer, value_for_closure.clone(), capacity),
            }),
            ChannelHead::Subscribed { handlers, buffer } => Arc::new(ChannelHead::Subscribed {
                handlers: handlers.clone(),
                buffer: push_bounded(buffer, value_for_closure.clone(), capacity),
            }),
        });

        match &*old {
            ChannelHead::Completed { .. } => false,
            ChannelHead::Initial { .. } => true,
            ChannelHead::Subscribed { handlers, .. } => {
                for weak in handlers {
                    if let Some(handler) = weak.upgrade() {
                        handler.dispatch(
                            HandlerEvent::Update(value.clone()),
                            from.clone().unwrap_or(Executor::Immediate),
                        );
                    }
                }
                true
            }
        }
    }

    /// Completes the channel, unless it is already completed. Returns
    /// whether this call performed the completion.
    pub fn complete(&self, result: Fallible<(), E>, from: Option<Executor>) -> bool {
        let value = Arc::new(result);
        let value_for_closure = Arc::clone(&value);

        let (old, _new) = self.inner.head.update_head(move |current| match current.as_ref() {
            ChannelHead::Completed { .. } => Arc::clone(current),
            _ => Arc::new(ChannelHead::Completed {
                buffer: Arc::clone(current.buffer()),
                result: Arc::clone(&value_for_closure),
            }),
        });

        let transitioned = match &*old {
            ChannelHead::Completed { .. } => false,
            ChannelHead::Initial { .. } => true,
            ChannelHead::Subscribed { handlers, .. } => {
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
        }

        transitioned
    }
}

impl<T, E> Cancellable for Producer<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: FlowError,
{
    fn cancel(&self) {
        self.complete(Fallible::Failure(E::cancelled()), None);
    }
}

impl<T, E> Channel<T, E>
where
    T: Clone + Send + 'static,
    E: Send + 'static,
{
    /// Subscribes for updates and the terminal completion. Any buffered
    /// updates are replayed first, in order, before live delivery begins.
    pub fn subscribe(
        &self,
        executor: Executor,
        on_event: impl FnMut(HandlerEvent<T, E, ()>, Executor) + Send + 'static,
    ) -> Handler<T, E, ()> {
        let handler = Handler::new(executor.clone(), on_event);
        let weak = handler.downgrade();

        let (old, new) = self.inner.head.update_head(|current| match current.as_ref() {
            ChannelHead::Completed { .. } => Arc::clone(current),
            ChannelHead::Initial { buffer } => Arc::new(ChannelHead::Subscribed {
                handlers: vec![weak.clone()],
                buffer: Arc::clone(buffer),
            }),
            ChannelHead::Subscribed { handlers, buffer } => {
                let mut next = handlers.clone();
                next.push(weak.clone());
                Arc::new(ChannelHead::Subscribed {
                    handlers: next,
                    buffer: Arc::clone(buffer),
                })
            }
        });

        // `new`'s buffer is the snapshot that already includes this
        // handler in the subscriber list (or is the terminal buffer, if
        // the channel completed concurrently) — replaying from it, not
        // from a separately-read buffer, is what avoids double delivery.
        for item in new.buffer().iter() {
            handler.dispatch(HandlerEvent::Update(item.clone()), executor.clone());
        }

        match &*old {
            ChannelHead::Completed { result, .. } => {
                handler.dispatch(HandlerEvent::Completion(Arc::clone(result)), executor);
            }
            ChannelHead::Initial { .. } => {
                if let Some(notifier) = self.inner.lazy_start.lock().take() {
                    notifier();
                }
            }
            ChannelHead::Subscribed { .. } => {}
        }

        handler
    }

    pub fn is_completed(&self) -> bool {
        matches!(&*self.inner.head.load(), ChannelHead::Completed { .. })
    }

    /// The replay buffer's fixed capacity, as given to `Producer::new`.
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }
}
