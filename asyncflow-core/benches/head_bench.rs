// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use asyncflow_core::{Channel, Executor, Fallible, Producer, Promise};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn bench_future_subscribe_then_complete(c: &mut Criterion) {
    let mut group = c.benchmark_group("future_head");
    let subscriber_counts = [1usize, 8, 64, 256];

    for &subs in &subscriber_counts {
        group.throughput(Throughput::Elements(subs as u64));
        let id = BenchmarkId::from_parameter(format!("subscribers_{subs}"));
        group.bench_with_input(id, &subs, |bencher, &subs| {
            bencher.iter(|| {
                let promise: Promise<u64> = Promise::new(None::<fn()>);
                let future = promise.future();
                let delivered = Arc::new(AtomicUsize::new(0));

                let mut handlers = Vec::with_capacity(subs);
                for _ in 0..subs {
                    let delivered = Arc::clone(&delivered);
                    handlers.push(future.subscribe(Executor::Immediate, move |value, _| {
                        black_box(&value);
                        delivered.fetch_add(1, Ordering::Relaxed);
                    }));
                }

                promise.try_complete(Fallible::success(42u64), None);
                black_box(delivered.load(Ordering::Relaxed));
            });
        });
    }

    group.finish();
}

fn bench_channel_send_with_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("channel_head");
    let backlog_sizes = [0usize, 16, 128];

    for &backlog in &backlog_sizes {
        group.throughput(Throughput::Elements(backlog as u64 + 1));
        let id = BenchmarkId::from_parameter(format!("backlog_{backlog}"));
        group.bench_with_input(id, &backlog, |bencher, &backlog| {
            bencher.iter(|| {
                let producer: Producer<u64> = Producer::new(256, None::<fn()>);
                for i in 0..backlog {
                    producer.send(i as u64, None);
                }

                let channel: Channel<u64> = producer.channel();
                let delivered = Arc::new(AtomicUsize::new(0));
                let delivered_for_sub = Arc::clone(&delivered);
                let handler = channel.subscribe(Executor::Immediate, move |event, _| {
                    if let asyncflow_core::HandlerEvent::Update(value) = event {
                        black_box(value);
                        delivered_for_sub.fetch_add(1, Ordering::Relaxed);
                    }
                });

                producer.send(999, None);
                black_box(&handler);
                black_box(delivered.load(Ordering::Relaxed));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_future_subscribe_then_complete, bench_channel_send_with_replay);
criterion_main!(benches);
