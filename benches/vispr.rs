use bytes::Bytes;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use vispr::{Frame, compute_tag};

const KEY: [u8; 16] = *b"0123456789abcdef";
const UID: u16 = 0x0707;
const COUNTER: u64 = 0x1234567890abcdef;
const TOPIC: &str = "bench/topic";

// Tag computation benchmarks (MD5 digest + AES-ECB encrypt)
fn bench_tag_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("tag_compute");

    for size in [16, 64, 128, 255].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let message = vec![0u8; size];

            b.iter(|| {
                let tag = compute_tag(
                    black_box(&KEY),
                    black_box(UID),
                    black_box(COUNTER),
                    TOPIC,
                    &message,
                )
                .unwrap();
                black_box(tag);
            });
        });
    }
    group.finish();
}

// Frame encoding/decoding benchmarks
fn bench_frame_marshal(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_marshal");

    for size in [16, 64, 128, 255].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let message = vec![0u8; size];
            let tag = compute_tag(&KEY, UID, COUNTER, TOPIC, &message).unwrap();
            let frame = Frame {
                uid: UID,
                tag,
                counter: COUNTER,
                topic: TOPIC.to_string(),
                message: Bytes::from(message),
            };

            b.iter(|| {
                let encoded = frame.marshal().unwrap();
                black_box(encoded);
            });
        });
    }
    group.finish();
}

fn bench_frame_unmarshal(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_unmarshal");

    for size in [16, 64, 128, 255].iter() {
        let message = vec![0u8; *size];
        let tag = compute_tag(&KEY, UID, COUNTER, TOPIC, &message).unwrap();
        let frame = Frame {
            uid: UID,
            tag,
            counter: COUNTER,
            topic: TOPIC.to_string(),
            message: Bytes::from(message),
        };
        let encoded = frame.marshal().unwrap();

        group.throughput(Throughput::Bytes(encoded.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &encoded, |b, encoded| {
            b.iter(|| {
                let decoded = Frame::unmarshal(black_box(encoded)).unwrap();
                black_box(decoded);
            });
        });
    }
    group.finish();
}

// Full per-broadcast encode cost (tag + frame marshal)
fn bench_broadcast_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadcast_encode");

    for size in [16, 64, 128, 255].iter() {
        group.throughput(Throughput::Bytes(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let message = Bytes::from(vec![0u8; size]);

            b.iter(|| {
                let tag = compute_tag(&KEY, UID, COUNTER, TOPIC, black_box(&message)).unwrap();
                let frame = Frame {
                    uid: UID,
                    tag,
                    counter: COUNTER,
                    topic: TOPIC.to_string(),
                    message: message.clone(),
                };
                let encoded = frame.marshal().unwrap();
                black_box(encoded);
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_tag_compute,
    bench_frame_marshal,
    bench_frame_unmarshal,
    bench_broadcast_encode
);

criterion_main!(benches);
