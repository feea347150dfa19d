// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! KVO/property bridge (component §4.K): the trait boundary a host-specific
//! adaptor crate implements, plus two free functions that wrap any
//! implementor in a `Channel` or a two-way `ProducerProxy`.
//!
//! No OS-level observation mechanism lives here — `PropertyObservable` is
//! the interface boundary only, the same way `Executor::Custom` is the
//! boundary for a host's own scheduler.

use std::pin::Pin;
use std::sync::Arc;

use futures::future::{self, Either};
use futures::stream::{Stream, StreamExt};

use asyncflow_core::{AsyncFlowError, Channel, Fallible, Producer, ProducerProxy};
use asyncflow_exec::AsyncFlowTask;

/// A host-observed mutable property of type `T`, e.g. a KVO-compliant field
/// on an Objective-C/Swift object, or a GObject property. `observe` yields
/// `None` whenever the host reports the property has no current value.
pub trait PropertyObservable<T>: Send + Sync + 'static
where
    T: Send + 'static,
{
    fn observe(&self) -> Pin<Box<dyn Stream<Item = Option<T>> + Send>>;
    fn set(&self, value: T);
}

/// What `producer_proxy_from_property` does with a `None` observed from the
/// property, when forwarding it back upstream as a plain `T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoneHandling {
    /// Silently discards the observation.
    Drop,
    /// Substitutes `T::default()`.
    ReplaceWithDefault,
}

/// Races `stream.next()` against `token.cancelled()`, so the bridging task
/// above stops promptly instead of blocking forever on a property that never
/// emits again after cancellation.
async fn next_or_cancelled<T>(
    stream: &mut Pin<Box<dyn Stream<Item = Option<T>> + Send>>,
    token: &asyncflow_core::CancellationToken,
) -> Option<Option<T>> {
    let next = stream.next();
    futures::pin_mut!(next);
    match future::select(next, token.cancelled()).await {
        Either::Left((item, _)) => item,
        Either::Right(((), _)) => None,
    }
}

/// One-way bridge: observes `property` and forwards every emission onto a
/// `Channel`. The channel completes successfully once `property` drops its
/// stream or the returned channel's backing task is cancelled.
pub fn channel_from_property<P, T>(property: Arc<P>) -> Channel<Option<T>, AsyncFlowError>
where
    P: PropertyObservable<T>,
    T: Clone + Send + Sync + 'static,
{
    let producer = Producer::<Option<T>, AsyncFlowError>::new(1, None::<fn()>);
    let channel = producer.channel();
    let downstream = producer.clone();

    let task = AsyncFlowTask::spawn(move |token| async move {
        let mut stream = property.observe();
        while let Some(value) = next_or_cancelled(&mut stream, &token).await {
            if !downstream.send(value, None) {
                break;
            }
        }
        downstream.complete(Fallible::success(()), None);
    });

    producer.retain_until_complete(Arc::new(task));
    channel
}

/// Two-way bridge: observes `property` into the proxy's channel, and feeds
/// every downstream `set` back into `property` via
/// [`PropertyObservable::set`]. `none_handling` decides what happens to a
/// `None` observation when it is fed back upstream.
pub fn producer_proxy_from_property<P, T>(
    property: Arc<P>,
    none_handling: NoneHandling,
) -> ProducerProxy<Option<T>, AsyncFlowError>
where
    P: PropertyObservable<T>,
    T: Clone + Default + Send + Sync + 'static,
{
    let property_for_setter = Arc::clone(&property);
    let proxy = ProducerProxy::<Option<T>, AsyncFlowError>::new(1, move |value| match value {
        Some(v) => property_for_setter.set(v),
        None => match none_handling {
            NoneHandling::Drop => {}
            NoneHandling::ReplaceWithDefault => property_for_setter.set(T::default()),
        },
    });

    let upstream = proxy.clone();
    let task = AsyncFlowTask::spawn(move |token| async move {
        let mut stream = property.observe();
        while let Some(value) = next_or_cancelled(&mut stream, &token).await {
            upstream.try_update_without_handling(value);
        }
    });

    proxy.retain_until_complete(Arc::new(task));
    proxy
}
