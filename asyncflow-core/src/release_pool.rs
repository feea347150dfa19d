// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The release pool (component C): a one-shot container draining exactly
//! once, at completion, releasing whatever it was asked to keep alive and
//! running whatever it was asked to run on drain.

use std::any::Any;
use std::sync::Arc;

use parking_lot::Mutex;

struct State {
    keep_alive: Vec<Arc<dyn Any + Send + Sync>>,
    on_drain: Vec<Box<dyn FnOnce() + Send>>,
}

/// Keeps arbitrary values alive until a single `drain()`, after which
/// further `insert`/`notify_drain` calls are no-ops (or run immediately, for
/// `notify_drain`).
pub struct ReleasePool {
    state: Mutex<Option<State>>,
}

impl Default for ReleasePool {
    fn default() -> Self {
        Self::new()
    }
}

impl ReleasePool {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(Some(State {
                keep_alive: Vec::new(),
                on_drain: Vec::new(),
            })),
        }
    }

    /// Keeps `value` alive until this pool drains. No-op if already drained.
    pub fn insert(&self, value: Arc<dyn Any + Send + Sync>) {
        if let Some(state) = self.state.lock().as_mut() {
            state.keep_alive.push(value);
        }
    }

    /// Runs `block` when this pool drains, or immediately if it already has.
    pub fn notify_drain(&self, block: impl FnOnce() + Send + 'static) {
        let mut guard = self.state.lock();
        match guard.as_mut() {
            Some(state) => state.on_drain.push(Box::new(block)),
            None => {
                drop(guard);
                block();
            }
        }
    }

    /// Drains this pool, releasing everything kept alive and running every
    /// registered drain callback. Idempotent: only the first call has any
    /// effect.
    pub fn drain(&self) {
        let state = self.state.lock().take();
        if let Some(state) = state {
            drop(state.keep_alive);
            for callback in state.on_drain {
                callback();
            }
        }
    }

    pub fn is_drained(&self) -> bool {
        self.state.lock().is_none()
    }
}
