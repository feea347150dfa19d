// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Core asynchronous-value state machine for asyncflow.
//!
//! This crate owns the whole lock-free subscription/notification protocol:
//! the atomic head container ([`head`]), the executor contract
//! ([`executor`]), the two concrete value shapes built on top of it
//! ([`future`] single-value, [`channel`] multi-value), the handler record
//! they share ([`handler`]), and the lifecycle primitives
//! ([`cancellation_token`], [`release_pool`], [`execution_context`]) that
//! keep all of it safe under arbitrary drop order.
//!
//! Nothing in here depends on a concrete async runtime; `asyncflow-runtime`
//! and `asyncflow-exec` supply the timer/spawn backends this crate's
//! `Executor::Primary`/`Priority`/delayed dispatch calls into.

pub mod cancellation_token;
pub mod channel;
pub mod error;
pub mod executor;
pub mod execution_context;
pub mod fallible;
pub mod future;
pub mod handler;
pub mod head;
mod lock_utilities;
pub mod producer_proxy;
pub mod release_pool;
mod runtime_dispatch;

pub use cancellation_token::{Cancellable, CancellationToken};
pub use channel::{Channel, Producer};
pub use error::{AsyncFlowError, FlowError, IntoAsyncFlowError, Result, ResultExt};
pub use executor::{Executor, PriorityLane};
pub use execution_context::{
    future_with_context, ContextDependent, ExecutionContext, StandardExecutionContext, WeakExecutionContext,
};
pub use fallible::Fallible;
pub use future::{Future, Promise};
pub use handler::{Handler, HandlerEvent};
pub use producer_proxy::ProducerProxy;
pub use release_pool::ReleasePool;

/// Re-exports the common set of items most call sites need.
pub mod prelude {
    pub use crate::{
        AsyncFlowError, Cancellable, CancellationToken, Channel, ExecutionContext, Executor, Fallible, Future,
        Handler, HandlerEvent, PriorityLane, Producer, ProducerProxy, Promise, StandardExecutionContext,
    };
}
