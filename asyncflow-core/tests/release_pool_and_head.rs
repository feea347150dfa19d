// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use asyncflow_core::head::AtomicHead;
use asyncflow_core::{Fallible, Promise, ReleasePool};

#[test]
fn release_pool_drains_exactly_once() {
    let pool = ReleasePool::new();
    let drain_count = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        let count = Arc::clone(&drain_count);
        pool.notify_drain(move || {
            count.fetch_add(1, Ordering::SeqCst);
        });
    }

    pool.drain();
    pool.drain();
    pool.drain();

    assert_eq!(drain_count.load(Ordering::SeqCst), 3);
    assert!(pool.is_drained());
}

#[test]
fn release_pool_runs_late_notify_drain_immediately() {
    let pool = ReleasePool::new();
    pool.drain();

    let ran = Arc::new(AtomicUsize::new(0));
    let ran_for_closure = Arc::clone(&ran);
    pool.notify_drain(move || {
        ran_for_closure.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(ran.load(Ordering::SeqCst), 1, "notify_drain after drain should run immediately");
}

#[test]
fn release_pool_releases_keep_alive_on_drain() {
    let pool = ReleasePool::new();
    let marker = Arc::new(());
    pool.insert(marker.clone());

    let weak: Weak<()> = Arc::downgrade(&marker);
    drop(marker);
    assert!(weak.upgrade().is_some(), "pool keeps the value alive until drain");

    pool.drain();
    assert!(weak.upgrade().is_none(), "drain releases everything it was keeping alive");
}

#[test]
fn no_leaks_promise_with_no_subscribers_becomes_unreachable() {
    let promise: Promise<u32> = Promise::new(None::<fn()>);
    let future = promise.future();
    assert_eq!(future.shared_handle_count(), 2, "promise + future share one Arc");

    drop(promise);
    assert_eq!(
        future.shared_handle_count(),
        1,
        "dropping the promise with no live subscribers leaves only the caller's future handle"
    );
}

#[test]
fn atomic_head_update_head_returns_old_and_new() {
    let head: AtomicHead<u32> = AtomicHead::new(0);

    let (old, new) = head.update_head(|current| Arc::new(**current + 1));
    assert_eq!(*old, 0);
    assert_eq!(*new, 1);
    assert_eq!(*head.load(), 1);
}

#[test]
fn atomic_head_survives_contended_updates() {
    let head: Arc<AtomicHead<u32>> = Arc::new(AtomicHead::new(0));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let head = Arc::clone(&head);
            std::thread::spawn(move || {
                for _ in 0..1000 {
                    head.update_head(|current| Arc::new(**current + 1));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(*head.load(), 8000);
}

#[test]
fn fallible_lift_success_catching_turns_panic_into_failure() {
    let value: Fallible<u32> = Fallible::success(10);
    let result = value.lift_success_catching(|v| {
        if v == 10 {
            panic!("boom");
        }
        v
    });
    assert!(result.is_failure());
}
