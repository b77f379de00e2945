use std::{hint::black_box, sync::Arc};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tidings::{Broker, Delivery, Message, Queue, RingbufQueue, SyncHandler, TopicKey};

fn noop() -> SyncHandler {
    SyncHandler::new(|d: &Delivery| {
        black_box(d);
        Ok(())
    })
}

fn bench_subscribe_unsubscribe(c: &mut Criterion) {
    let broker = Broker::new();
    let h = noop();
    c.bench_function("broker_subscribe_unsubscribe", |b| {
        b.iter(|| {
            broker.subscribe("chan", &h).unwrap();
            black_box(broker.unsubscribe("chan", &h));
        })
    });
}

fn bench_subscribe_unsubscribe_id(c: &mut Criterion) {
    let broker = Broker::new();
    let h = noop();
    c.bench_function("broker_subscribe_unsubscribe_id", |b| {
        b.iter(|| {
            let id = broker.subscribe_with("chan", &h, [1, 42]).unwrap();
            black_box(broker.unsubscribe_id(id));
        })
    });
}

fn bench_publish_0_subs(c: &mut Criterion) {
    let broker = Broker::new();
    c.bench_function("publish_0_subs", |b| {
        b.iter(|| black_box(broker.publish("chan", black_box("x"))))
    });
}

fn bench_publish_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("publish_fanout_sync");
    for n in [1usize, 10, 100] {
        let broker = Broker::new();
        for _ in 0..n {
            broker.subscribe("chan", noop()).unwrap();
        }
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| black_box(broker.publish("chan", black_box("x"))))
        });
    }
    group.finish();
}

fn bench_publish_pattern(c: &mut Criterion) {
    let mut group = c.benchmark_group("publish_pattern");
    let regex = Broker::new();
    regex
        .subscribe(TopicKey::regex(".*_topic").unwrap(), noop())
        .unwrap();
    let glob = Broker::new();
    glob.subscribe(TopicKey::glob("*_topic").unwrap(), noop())
        .unwrap();

    group.bench_function("regex", |b| {
        b.iter(|| black_box(regex.publish("foo_topic", "x")))
    });
    group.bench_function("glob", |b| {
        b.iter(|| black_box(glob.publish("foo_topic", "x")))
    });
    group.finish();
}

fn bench_publish_buffers(c: &mut Criterion) {
    let broker = Broker::new();
    let q: Arc<Queue<Message>> = Arc::new(Queue::new(1));
    let rq: Arc<RingbufQueue<Delivery>> = Arc::new(RingbufQueue::new(16));
    broker.subscribe("full", &q).unwrap();
    broker.publish("full", "fill");
    broker.subscribe_with("ring", &rq, ["args"]).unwrap();

    c.bench_function("publish_queue_full_drop", |b| {
        b.iter(|| black_box(broker.publish("full", "x")))
    });
    c.bench_function("publish_ring_overwrite", |b| {
        b.iter(|| black_box(broker.publish("ring", "x")))
    });
}

criterion_group!(
    benches,
    bench_subscribe_unsubscribe,
    bench_subscribe_unsubscribe_id,
    bench_publish_0_subs,
    bench_publish_fanout,
    bench_publish_pattern,
    bench_publish_buffers,
);
criterion_main!(benches);
