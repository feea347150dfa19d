// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `zip`: pairs items from two channels in arrival order. Each side buffers
//! whatever arrived and has no partner yet; a pair is emitted as soon as
//! both sides have one available. Completes successfully once both sides
//! have completed successfully and no pairable backlog remains; either
//! side's failure completes the zipped channel with that failure
//! immediately.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use asyncflow_core::{Channel, Executor, Fallible, HandlerEvent, Producer};

struct ZipState<A, B> {
    left: VecDeque<A>,
    right: VecDeque<B>,
    left_done: bool,
    right_done: bool,
}

pub fn zip<A, B, E>(left: &Channel<A, E>, right: &Channel<B, E>) -> Channel<(A, B), E>
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
    E: Clone + Send + Sync + 'static,
{
    let capacity = left.capacity().max(right.capacity());
    let producer = Producer::<(A, B), E>::new(capacity, None::<fn()>);

    let state = Arc::new(Mutex::new(ZipState::<A, B> {
        left: VecDeque::new(),
        right: VecDeque::new(),
        left_done: false,
        right_done: false,
    }));

    let downstream_for_left = producer.clone();
    let state_for_left = Arc::clone(&state);
    let left_handler = left.subscribe(Executor::Immediate, move |event, from| match event {
        HandlerEvent::Update(value) => {
            let mut guard = state_for_left.lock();
            guard.left.push_back(value);
            drain_pairs(&mut guard, &downstream_for_left, from);
        }
        HandlerEvent::Completion(result) => match &*result {
            Fallible::Success(()) => {
                let mut guard = state_for_left.lock();
                guard.left_done = true;
                complete_if_drained(&guard, &downstream_for_left, from);
            }
            Fallible::Failure(error) => {
                downstream_for_left.complete(Fallible::Failure(error.clone()), Some(from));
            }
        },
    });

    let downstream_for_right = producer.clone();
    let state_for_right = Arc::clone(&state);
    let right_handler = right.subscribe(Executor::Immediate, move |event, from| match event {
        HandlerEvent::Update(value) => {
            let mut guard = state_for_right.lock();
            guard.right.push_back(value);
            drain_pairs(&mut guard, &downstream_for_right, from);
        }
        HandlerEvent::Completion(result) => match &*result {
            Fallible::Success(()) => {
                let mut guard = state_for_right.lock();
                guard.right_done = true;
                complete_if_drained(&guard, &downstream_for_right, from);
            }
            Fallible::Failure(error) => {
                downstream_for_right.complete(Fallible::Failure(error.clone()), Some(from));
            }
        },
    });

    left_handler.retain_owner(Arc::new(left.clone()));
    right_handler.retain_owner(Arc::new(right.clone()));
    producer.retain_until_complete(Arc::new((left_handler, right_handler)));

    producer.channel()
}

fn drain_pairs<A, B, E>(state: &mut ZipState<A, B>, downstream: &Producer<(A, B), E>, from: Executor)
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
    E: Clone + Send + Sync + 'static,
{
    while !state.left.is_empty() && !state.right.is_empty() {
        let pair = (state.left.pop_front().unwrap(), state.right.pop_front().unwrap());
        downstream.send(pair, Some(from.clone()));
    }
}

fn complete_if_drained<A, B, E>(state: &ZipState<A, B>, downstream: &Producer<(A, B), E>, from: Executor)
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
    E: Clone + Send + Sync + 'static,
{
    let drained = state.left.is_empty() || state.right.is_empty();
    if state.left_done && state.right_done && drained {
        downstream.complete(Fallible::Success(()), Some(from));
    }
}
