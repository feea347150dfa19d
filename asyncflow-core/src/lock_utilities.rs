// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Poisoned-`std::sync::Mutex` recovery, for the handful of blocking
//! primitives in this crate that use a plain `std::sync::Mutex` instead of
//! the lock-free head (currently only `Future::wait`'s condition-variable
//! gate, indirectly via `parking_lot` which does not poison — kept here as
//! the shared recovery pattern for anything that later needs a
//! poison-capable `std::sync::Mutex`).

use std::sync::{Mutex, MutexGuard, PoisonError};

#[cfg(feature = "tracing")]
macro_rules! warn_poisoned {
    ($context:expr) => {
        tracing::warn!(context = $context, "recovering from a poisoned mutex")
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! warn_poisoned {
    ($context:expr) => {
        let _ = $context;
    };
}

/// Locks `mutex`, recovering the guard from a poisoned lock rather than
/// propagating the panic of whatever thread poisoned it.
pub fn safe_lock<'a, T>(mutex: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn_poisoned!(context);
            poisoned.into_inner()
        }
    }
}

pub fn recover<T>(result: Result<T, PoisonError<T>>, context: &str) -> T {
    match result {
        Ok(value) => value,
        Err(poisoned) => {
            warn_poisoned!(context);
            poisoned.into_inner()
        }
    }
}
