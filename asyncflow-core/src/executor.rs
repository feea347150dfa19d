// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The executor abstraction (component B).
//!
//! Per the design note that dynamic dispatch over executor families should
//! be a tagged variant rather than a trait-object hierarchy, `Executor` is a
//! plain enum. Only the `Custom` variant reaches for a vtable, and only for
//! the dispatch closure itself.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::runtime_dispatch;

type BoxedTask = Box<dyn FnOnce() + Send>;

/// Relative priority for the `Priority` executor variant. Mirrors the handful
/// of QoS classes a host platform typically exposes, without committing to
/// any one platform's names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PriorityLane {
    UserInteractive,
    UserInitiated,
    Utility,
    Background,
}

#[derive(Clone)]
struct QueueHandle {
    name: Arc<str>,
    dispatch: Arc<dyn Fn(BoxedTask) + Send + Sync>,
}

#[derive(Clone)]
struct CustomHandle {
    strict_async: bool,
    dispatch: Arc<dyn Fn(BoxedTask) + Send + Sync>,
    dispatch_after: Arc<dyn Fn(Duration, BoxedTask) + Send + Sync>,
}

/// Where a handler's block runs.
///
/// `Immediate` runs inline on whatever thread completes or sends; the rest
/// enqueue onto some executor, synchronously or not depending on
/// `strict_async` and on whether the caller is already running on the same
/// executor (see [`Executor::execute`]).
#[derive(Clone)]
pub enum Executor {
    /// Runs inline, on the calling thread, always. Never `strict_async`.
    Immediate,
    /// The runtime's primary/default async executor (e.g. tokio's default
    /// multi-thread pool).
    Primary,
    /// A priority-tagged lane on the primary executor.
    Priority(PriorityLane),
    /// A caller-identified serial queue. Two `Queue` executors constructed
    /// from the same handle compare equal for same-executor inlining.
    Queue(QueueHandle),
    /// A user-supplied dispatch function, optionally also supporting
    /// delayed dispatch.
    Custom(CustomHandle),
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate => write!(f, "Executor::Immediate"),
            Self::Primary => write!(f, "Executor::Primary"),
            Self::Priority(lane) => write!(f, "Executor::Priority({lane:?})"),
            Self::Queue(q) => write!(f, "Executor::Queue({:?})", q.name),
            Self::Custom(_) => write!(f, "Executor::Custom"),
        }
    }
}

impl Executor {
    /// Builds a named serial-queue executor from a dispatch function.
    pub fn queue(name: impl Into<Arc<str>>, dispatch: impl Fn(BoxedTask) + Send + Sync + 'static) -> Self {
        Self::Queue(QueueHandle {
            name: name.into(),
            dispatch: Arc::new(dispatch),
        })
    }

    /// Builds a fully custom executor. `strict_async` controls whether
    /// `execute` may ever run its block inline.
    pub fn custom(
        strict_async: bool,
        dispatch: impl Fn(BoxedTask) + Send + Sync + 'static,
        dispatch_after: impl Fn(Duration, BoxedTask) + Send + Sync + 'static,
    ) -> Self {
        Self::Custom(CustomHandle {
            strict_async,
            dispatch: Arc::new(dispatch),
            dispatch_after: Arc::new(dispatch_after),
        })
    }

    /// Whether this executor forbids inline (same-thread, same-call-stack)
    /// delivery even when the caller already runs on it.
    pub fn strict_async(&self) -> bool {
        match self {
            Self::Immediate => false,
            Self::Primary | Self::Priority(_) => true,
            Self::Queue(_) => true,
            Self::Custom(c) => c.strict_async,
        }
    }

    fn same_as(&self, other: &Executor) -> bool {
        match (self, other) {
            (Self::Immediate, Self::Immediate) => true,
            (Self::Primary, Self::Primary) => true,
            (Self::Priority(a), Self::Priority(b)) => a == b,
            (Self::Queue(a), Self::Queue(b)) => Arc::ptr_eq(&a.dispatch, &b.dispatch),
            (Self::Custom(a), Self::Custom(b)) => Arc::ptr_eq(&a.dispatch, &b.dispatch),
            _ => false,
        }
    }

    /// Runs `block` on this executor, passing it the executor that actually
    /// ran it (itself, unless delivery was inlined because `from` names the
    /// same executor and this one isn't `strict_async`).
    ///
    /// `from` is the executor the caller was already running on, if known.
    /// Passing `None` always schedules through this executor's normal path.
    pub fn execute(&self, from: Option<&Executor>, block: impl FnOnce(Executor) + Send + 'static) {
        let inline = !self.strict_async() && from.is_some_and(|f| self.same_as(f));
        if inline {
            block(self.clone());
            return;
        }
        let origin = self.clone();
        let task: BoxedTask = Box::new(move || block(origin));
        match self {
            Self::Immediate => task(),
            Self::Primary => runtime_dispatch::spawn_primary(task),
            Self::Priority(lane) => runtime_dispatch::spawn_priority(*lane, task),
            Self::Queue(q) => (q.dispatch)(task),
            Self::Custom(c) => (c.dispatch)(task),
        }
    }

    /// Schedules `block` to run after `delay`, on this executor.
    pub fn execute_after(&self, delay: Duration, block: impl FnOnce(Executor) + Send + 'static) {
        let origin = self.clone();
        let task: BoxedTask = Box::new(move || block(origin));
        match self {
            Self::Custom(c) => (c.dispatch_after)(delay, task),
            other => runtime_dispatch::spawn_after(other.clone(), delay, task),
        }
    }
}
