//! Benchmarks for the receive-to-process packet handoff
//!
//! - Single-threaded push/pop round trip per datagram
//! - Producer/consumer throughput across two threads
//!
//! Platform: Cross-platform (in-memory, CI-safe)

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use depthlink::PacketQueue;
use depthlink::protocol::MAX_UDP_PAYLOAD;
use std::hint::black_box;
use std::sync::Arc;
use std::thread;

fn bench_push_pop(c: &mut Criterion) {
    let queue = PacketQueue::unbounded();
    let datagram = vec![0u8; MAX_UDP_PAYLOAD];

    c.bench_function("queue_push_pop", |b| {
        b.iter(|| {
            queue.push(black_box(datagram.clone()));
            black_box(queue.pop())
        })
    });
}

fn bench_cross_thread(c: &mut Criterion) {
    const BATCH: usize = 1_000;

    let mut group = c.benchmark_group("queue_cross_thread");
    group.throughput(Throughput::Elements(BATCH as u64));
    group.bench_function("batch_1000", |b| {
        b.iter(|| {
            let queue = Arc::new(PacketQueue::unbounded());
            let consumer = {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    let mut received = 0;
                    while queue.pop().is_some() {
                        received += 1;
                    }
                    received
                })
            };

            for _ in 0..BATCH {
                queue.push(vec![0u8; MAX_UDP_PAYLOAD]);
            }
            queue.destroy();
            black_box(consumer.join().expect("consumer panicked"))
        })
    });
    group.finish();
}

criterion_group!(benches, bench_push_pop, bench_cross_thread);
criterion_main!(benches);
