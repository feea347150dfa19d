// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `Fallible<T, E>`: the success/failure sum type carried by every completed
//! `Future` and `Channel`.

use crate::error::AsyncFlowError;

/// A value that is either a success `T` or a failure `E`.
///
/// Distinct from `std::result::Result` only in name and in the vocabulary
/// (`lift_success`/`lift_failure`) used to transform it, matching the
/// terminology the rest of this crate's API surface uses.
#[derive(Debug, Clone)]
pub enum Fallible<T, E = AsyncFlowError> {
    Success(T),
    Failure(E),
}

impl<T, E> Fallible<T, E> {
    pub const fn success(value: T) -> Self {
        Self::Success(value)
    }

    pub const fn failure(error: E) -> Self {
        Self::Failure(error)
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    pub fn success_value(self) -> Option<T> {
        match self {
            Self::Success(v) => Some(v),
            Self::Failure(_) => None,
        }
    }

    pub fn failure_value(self) -> Option<E> {
        match self {
            Self::Success(_) => None,
            Self::Failure(e) => Some(e),
        }
    }

    pub fn as_ref(&self) -> Fallible<&T, &E> {
        match self {
            Self::Success(v) => Fallible::Success(v),
            Self::Failure(e) => Fallible::Failure(e),
        }
    }

    /// Transforms the success value, leaving a failure untouched.
    pub fn lift_success<U>(self, transform: impl FnOnce(T) -> U) -> Fallible<U, E> {
        match self {
            Self::Success(v) => Fallible::Success(transform(v)),
            Self::Failure(e) => Fallible::Failure(e),
        }
    }

    /// Transforms the success value into a new `Fallible`, flattening one
    /// level (the monadic `flat_map` used by `flat_map`/`merge` combinators).
    pub fn and_then<U>(self, transform: impl FnOnce(T) -> Fallible<U, E>) -> Fallible<U, E> {
        match self {
            Self::Success(v) => transform(v),
            Self::Failure(e) => Fallible::Failure(e),
        }
    }

    /// Transforms the failure value, leaving a success untouched.
    pub fn map_failure<E2>(self, transform: impl FnOnce(E) -> E2) -> Fallible<T, E2> {
        match self {
            Self::Success(v) => Fallible::Success(v),
            Self::Failure(e) => Fallible::Failure(transform(e)),
        }
    }

    /// Recovers from a failure unconditionally, producing a success value
    /// either way. Mirrors a non-throwing `liftFailure`.
    pub fn recover(self, transform: impl FnOnce(E) -> T) -> T {
        match self {
            Self::Success(v) => v,
            Self::Failure(e) => transform(e),
        }
    }

    /// Recovers from a failure with a transform that may itself fail.
    /// Mirrors a throwing `liftFailure`.
    pub fn recover_with(self, transform: impl FnOnce(E) -> Fallible<T, E>) -> Fallible<T, E> {
        match self {
            Self::Success(v) => Fallible::Success(v),
            Self::Failure(e) => transform(e),
        }
    }
}

impl<T> Fallible<T, AsyncFlowError> {
    /// `lift_success`, catching a panic raised by `transform` and turning it
    /// into an `AsyncFlowError::User` failure instead of unwinding. Mirrors
    /// spec's "liftSuccess(transform: T -> throws U)" for the default error
    /// type.
    pub fn lift_success_catching<U>(
        self,
        transform: impl FnOnce(T) -> U + std::panic::UnwindSafe,
    ) -> Fallible<U, AsyncFlowError> {
        match self {
            Self::Success(v) => match std::panic::catch_unwind(|| transform(v)) {
                Ok(u) => Fallible::Success(u),
                Err(payload) => Fallible::Failure(AsyncFlowError::user(PanicError::new(payload))),
            },
            Self::Failure(e) => Fallible::Failure(e),
        }
    }
}

impl<T, E> From<std::result::Result<T, E>> for Fallible<T, E> {
    fn from(result: std::result::Result<T, E>) -> Self {
        match result {
            Ok(v) => Self::Success(v),
            Err(e) => Self::Failure(e),
        }
    }
}

impl<T, E> From<Fallible<T, E>> for std::result::Result<T, E> {
    fn from(fallible: Fallible<T, E>) -> Self {
        match fallible {
            Fallible::Success(v) => Ok(v),
            Fallible::Failure(e) => Err(e),
        }
    }
}

#[derive(Debug)]
struct PanicError {
    message: String,
}

impl PanicError {
    fn new(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "transform panicked".to_string());
        Self { message }
    }
}

impl std::fmt::Display for PanicError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for PanicError {}
