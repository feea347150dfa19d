// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Cancellation tokens (component D): a fan-out cancellation signal, plus an
//! async `cancelled()` wait future for callers that want to observe
//! cancellation rather than register for it.
//!
//! Grounded in the teacher's `CancellationToken` (`AtomicBool` +
//! `event_listener::Event`), generalized with an `add(cancellable)` fan-out
//! list so a token can directly cancel a set of dependents instead of only
//! supporting cooperative polling.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use event_listener::{Event, EventListener};
use parking_lot::Mutex;

/// Anything that can be told to cancel itself. Implemented by `Promise` and
/// `Producer` so a `CancellationToken` can fan its signal out to them.
pub trait Cancellable: Send + Sync {
    fn cancel(&self);
}

struct Inner {
    cancelled: AtomicBool,
    event: Event,
    cancellables: Mutex<Option<Vec<Arc<dyn Cancellable>>>>,
}

/// A shareable, fan-out cancellation signal.
#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                event: Event::new(),
                cancellables: Mutex::new(Some(Vec::new())),
            }),
        }
    }

    /// Registers `cancellable` to receive this token's cancellation signal.
    /// If the token is already cancelled, `cancellable.cancel()` runs
    /// immediately instead of being retained.
    pub fn add(&self, cancellable: Arc<dyn Cancellable>) {
        let mut guard = self.inner.cancellables.lock();
        match guard.as_mut() {
            Some(list) => list.push(cancellable),
            None => {
                drop(guard);
                cancellable.cancel();
            }
        }
    }

    /// Signals cancellation. Idempotent: only the first call fans out to
    /// registered cancellables and wakes `cancelled()` waiters.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        let drained = self.inner.cancellables.lock().take();
        if let Some(list) = drained {
            for cancellable in list {
                cancellable.cancel();
            }
        }
        self.inner.event.notify(usize::MAX);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// A future that resolves once this token is cancelled, resolving
    /// immediately if it already has been.
    pub fn cancelled(&self) -> Cancelled<'_> {
        Cancelled {
            token: self,
            listener: None,
        }
    }
}

pub struct Cancelled<'a> {
    token: &'a CancellationToken,
    listener: Option<Pin<Box<EventListener>>>,
}

impl Future for Cancelled<'_> {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        loop {
            if self.token.is_cancelled() {
                return Poll::Ready(());
            }

            if self.listener.is_none() {
                self.listener = Some(Box::pin(self.token.inner.event.listen()));
                // Re-check after registering, in case cancellation raced
                // between the first check and listener registration.
                continue;
            }

            let listener = self.listener.as_mut().unwrap();
            if listener.as_mut().poll(cx).is_pending() {
                return Poll::Pending;
            }
            self.listener = None;
        }
    }
}
