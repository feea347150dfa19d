// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # asyncflow
//!
//! A lock-free, runtime-agnostic core for asynchronous values
//! (`Future`/`Promise`) and ordered multi-value streams (`Channel`/
//! `Producer`), built on a single atomic-swap head container shared by both
//! shapes.
//!
//! This crate is the assembled front door: it re-exports
//! `asyncflow-core`'s state machines, `asyncflow-exec`'s timer-backed
//! `future_after`/background tasks, `asyncflow-combinators`' `map`/
//! `filter`/`flat_map`/`merge`/`zip`/`debounce`/`distinct`, and adds the
//! KVO/property-bridge surface ([`PropertyObservable`],
//! [`channel_from_property`], [`producer_proxy_from_property`]).
//!
//! ## Quick start
//!
//! ```rust
//! use asyncflow::prelude::*;
//!
//! let promise: Promise<u32> = Promise::new(None::<fn()>);
//! let future = promise.future();
//! promise.try_complete(Fallible::success(7), None);
//! assert!(matches!(future.wait(None).as_deref(), Some(Fallible::Success(7))));
//! ```

mod property;

pub use asyncflow_core::{
    AsyncFlowError, Cancellable, CancellationToken, Channel, ContextDependent, ExecutionContext, Executor,
    Fallible, FlowError, Future, Handler, HandlerEvent, IntoAsyncFlowError, PriorityLane, Producer,
    ProducerProxy, Promise, Result, ResultExt, StandardExecutionContext, WeakExecutionContext,
    future_with_context,
};

pub use asyncflow_exec::{future_after, future_after_value, AsyncFlowTask};

pub use asyncflow_combinators::{
    merge, zip, ChannelDebounceExt, ChannelDistinctExt, ChannelFilterExt, ChannelMapExt, FutureFlatMapExt,
    FutureMapExt,
};

pub use property::{channel_from_property, producer_proxy_from_property, NoneHandling, PropertyObservable};

/// Re-exports the common set of items most call sites need.
pub mod prelude {
    pub use crate::{
        future_after, future_after_value, merge, zip, AsyncFlowError, AsyncFlowTask, Cancellable,
        CancellationToken, Channel, ChannelDebounceExt, ChannelDistinctExt, ChannelFilterExt, ChannelMapExt,
        ExecutionContext, Executor, Fallible, Future, FutureFlatMapExt, FutureMapExt, NoneHandling,
        PriorityLane, Producer, ProducerProxy, Promise, PropertyObservable, StandardExecutionContext,
    };
}
