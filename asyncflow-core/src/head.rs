// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The lock-free head container (component E): the single synchronization
//! point every state transition in this crate goes through.
//!
//! `Future`/`Promise` and `Channel`/`Producer` both model their state as an
//! immutable snapshot `S` swapped in by compare-and-swap. Rather than hand
//! roll that loop twice, both build on this one generic `AtomicHead<S>`.

use std::cell::Cell;
use std::sync::Arc;

use arc_swap::ArcSwap;

/// An atomically-swapped, immutable state snapshot.
///
/// `S` is never mutated in place; every transition builds a new `Arc<S>`
/// from the previous one and swaps it in. Concurrent writers race on the
/// swap, not on a lock, and a loser simply recomputes its transition against
/// the winner's new state.
pub struct AtomicHead<S> {
    inner: ArcSwap<S>,
}

impl<S> AtomicHead<S> {
    pub fn new(initial: S) -> Self {
        Self {
            inner: ArcSwap::from_pointee(initial),
        }
    }

    /// Returns the current state without participating in a transition.
    pub fn load(&self) -> Arc<S> {
        self.inner.load_full()
    }

    /// Applies `transform` to the current state and swaps the result in,
    /// retrying automatically if a concurrent writer won the race first.
    ///
    /// `transform` must be a pure function of its input: it may be invoked
    /// more than once if contended, and only the invocation backing the
    /// winning swap is observable. Returns `(old, new)`, the state
    /// immediately before and after this call's transition.
    pub fn update_head<F>(&self, mut transform: F) -> (Arc<S>, Arc<S>)
    where
        F: FnMut(&Arc<S>) -> Arc<S>,
    {
        let committed = Cell::new(None);
        let old = self.inner.rcu(|current| {
            let next = transform(current);
            committed.set(Some(Arc::clone(&next)));
            next
        });
        let new = committed
            .into_inner()
            .expect("rcu invokes its closure at least once before returning");
        (Arc::clone(&old), new)
    }
}
