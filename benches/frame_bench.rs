//! Performance benchmarks for RS485 frame encoding.
//!
//! Frame encoding sits on the open-locker hot path, so it should stay
//! a handful of nanoseconds with zero allocation.
//!
//! Run benchmarks with:
//! ```sh
//! cargo bench --bench frame_bench
//! ```

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use hasp_core::{LockerNumber, Rs485Address};
use hasp_protocol::{CommandFrame, encode};
use std::hint::black_box;

/// Benchmark encoding from validated newtypes (pure construction).
fn bench_encode_validated(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_validated");
    group.throughput(Throughput::Elements(1));

    let address = Rs485Address::new(2).unwrap();
    let number = LockerNumber::new(7).unwrap();

    group.bench_function("open_frame", |b| {
        b.iter(|| {
            let frame = CommandFrame::open(black_box(address), black_box(number));
            black_box(frame);
        });
    });

    group.finish();
}

/// Benchmark the raw-integer boundary path including range validation.
fn bench_encode_raw(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_raw");
    group.throughput(Throughput::Elements(1));

    group.bench_function("encode_with_validation", |b| {
        b.iter(|| {
            let frame = encode(black_box(2), black_box(7)).unwrap();
            black_box(frame);
        });
    });

    group.finish();
}

/// Benchmark parse + checksum verification of a received frame.
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Elements(1));

    let frame = encode(2, 7).unwrap();
    let bytes = *frame.as_bytes();

    group.bench_function("parse_and_verify", |b| {
        b.iter(|| {
            let parsed = CommandFrame::parse(black_box(&bytes)).unwrap();
            black_box(parsed);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_encode_validated, bench_encode_raw, bench_parse);
criterion_main!(benches);
