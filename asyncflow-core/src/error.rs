// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error taxonomy for asyncflow's core state machines.
//!
//! The core itself only ever raises two error kinds: [`AsyncFlowError::Cancelled`]
//! and [`AsyncFlowError::ContextDeallocated`]. Everything else is an opaque,
//! caller-supplied failure carried through unchanged.

use std::fmt;
use std::sync::Arc;

/// Default failure type carried by [`crate::Fallible`].
///
/// Advanced users may substitute their own `E` on `Fallible<T, E>`, `Promise<T, E>`,
/// and `Producer<T, E>`, as long as it implements [`FlowError`] so the core can
/// manufacture its own two intrinsic kinds.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AsyncFlowError {
    /// Raised by cancellation tokens or an explicit `cancel()`.
    #[error("operation was cancelled")]
    Cancelled,

    /// Raised when a context-bound construction block runs after its
    /// `ExecutionContext` has already died.
    #[error("execution context was deallocated before the dependent value completed")]
    ContextDeallocated,

    /// Opaque failure from user code, passed through unchanged. Held behind
    /// an `Arc` (not a `Box`) so `AsyncFlowError` itself stays `Clone` —
    /// every `Fallible<T, E>` completion forwarded by the combinator crate
    /// clones its failure arm.
    #[error("{0}")]
    User(#[source] Arc<dyn std::error::Error + Send + Sync>),
}

impl AsyncFlowError {
    /// Wraps an arbitrary user error.
    pub fn user(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::User(Arc::new(error))
    }

    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub const fn is_context_deallocated(&self) -> bool {
        matches!(self, Self::ContextDeallocated)
    }
}

/// Trait bound required of any `E` used with the core's cancellation and
/// `ExecutionContext` plumbing: both of those features need to manufacture
/// one of the two intrinsic error kinds without knowing the concrete `E`.
pub trait FlowError: std::error::Error + Send + Sync + 'static {
    fn cancelled() -> Self;
    fn context_deallocated() -> Self;
}

impl FlowError for AsyncFlowError {
    fn cancelled() -> Self {
        Self::Cancelled
    }

    fn context_deallocated() -> Self {
        Self::ContextDeallocated
    }
}

/// Crate-wide `Result` alias, defaulting to [`AsyncFlowError`].
pub type Result<T, E = AsyncFlowError> = std::result::Result<T, E>;

/// Converts an arbitrary error into an [`AsyncFlowError::User`].
pub trait IntoAsyncFlowError {
    fn into_async_flow_error(self) -> AsyncFlowError;
}

impl<E: std::error::Error + Send + Sync + 'static> IntoAsyncFlowError for E {
    fn into_async_flow_error(self) -> AsyncFlowError {
        AsyncFlowError::user(self)
    }
}

#[derive(Debug)]
struct ContextualError {
    context: String,
    source: Arc<dyn std::error::Error + Send + Sync>,
}

impl fmt::Display for ContextualError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.context, self.source)
    }
}

impl std::error::Error for ContextualError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Fluent context chaining for `Result`s that terminate in an
/// [`AsyncFlowError`]. Never used by the core's own control flow; provided
/// for user code building custom failures.
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<AsyncFlowError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| attach_context(e.into(), context.into()))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| attach_context(e.into(), f()))
    }
}

fn attach_context(error: AsyncFlowError, context: String) -> AsyncFlowError {
    match error {
        AsyncFlowError::User(source) => {
            AsyncFlowError::User(Arc::new(ContextualError { context, source }))
        }
        other => other,
    }
}
