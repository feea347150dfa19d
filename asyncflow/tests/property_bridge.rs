// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::channel::mpsc;
use futures::stream::Stream;

use asyncflow::{channel_from_property, producer_proxy_from_property, HandlerEvent, NoneHandling, PropertyObservable};
use asyncflow_core::Executor;
use asyncflow_test_utils::wait_until;

/// A stand-in for a host-observed property: `set` both records the write and
/// feeds it back out through `observe`'s stream, the way a real KVO/GObject
/// adaptor would forward its own notification of the change.
struct FakeProperty {
    sender: mpsc::UnboundedSender<Option<u32>>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<Option<u32>>>>,
    last_set: Mutex<Vec<u32>>,
}

impl FakeProperty {
    fn new() -> (Arc<Self>, mpsc::UnboundedSender<Option<u32>>) {
        let (sender, receiver) = mpsc::unbounded();
        let property = Arc::new(Self {
            sender: sender.clone(),
            receiver: Mutex::new(Some(receiver)),
            last_set: Mutex::new(Vec::new()),
        });
        (property, sender)
    }
}

impl PropertyObservable<u32> for FakeProperty {
    fn observe(&self) -> Pin<Box<dyn Stream<Item = Option<u32>> + Send>> {
        let receiver = self.receiver.lock().unwrap().take().expect("observe called more than once in this test");
        Box::pin(receiver)
    }

    fn set(&self, value: u32) {
        self.last_set.lock().unwrap().push(value);
        let _ = self.sender.unbounded_send(Some(value));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn channel_from_property_forwards_every_emission() {
    let (property, sender) = FakeProperty::new();
    let channel = channel_from_property(Arc::clone(&property));

    let collected = Arc::new(Mutex::new(Vec::new()));
    let collected_for_closure = Arc::clone(&collected);
    let _handler = channel.subscribe(Executor::Immediate, move |event, _from| {
        if let HandlerEvent::Update(value) = event {
            collected_for_closure.lock().unwrap().push(value);
        }
    });

    sender.unbounded_send(Some(1)).unwrap();
    sender.unbounded_send(Some(2)).unwrap();

    wait_until(|| *collected.lock().unwrap() == vec![Some(1), Some(2)], Duration::from_secs(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn producer_proxy_feeds_downstream_updates_back_into_the_property() {
    let (property, _sender) = FakeProperty::new();
    let proxy = producer_proxy_from_property(Arc::clone(&property), NoneHandling::Drop);

    proxy.set(Some(42));

    wait_until(|| property.last_set.lock().unwrap().as_slice() == [42], Duration::from_secs(1));
}
