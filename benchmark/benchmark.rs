// Copyright (c) 2025-present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use biosimd::ascii_cleaner::clean_ascii_seq_inplace_scalar;
use biosimd::nibble_codec::{pack_seq_scalar, unpack_seq_scalar};
use biosimd::replace_unpacker::unpack_and_replace_seq_scalar;
use biosimd::{
    SEQ_NT16_TABLE, SimdEngine, alloc_with_slack, clean_ascii_seq_inplace,
    clean_ascii_seq_inplace_unsafe, pack_seq, pack_seq_unsafe, packed_len,
    unpack_and_replace_seq, unpack_and_replace_seq_unsafe, unpack_seq, unpack_seq_unsafe,
};

mod harness;

use harness::{Shard, build_pool, run_sharded};

/// Package version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Short-read length used by the sharded benchmarks.
const SHORT_LEN: usize = 75;

/// Chromosome-scale buffer used by the sharded benchmarks.
const LONG_LEN: usize = 16 * 1024 * 1024 + 13;

/// Print benchmark header with version, timestamp and engine
fn print_benchmark_header() {
    use std::sync::Once;
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        let _ = env_logger::builder().is_test(false).try_init();
        let now = chrono::Utc::now();
        eprintln!("\n╔════════════════════════════════════════════════════════════╗");
        eprintln!(
            "║ biosimd benchmark v{}                                    ║",
            VERSION
        );
        eprintln!(
            "║ Run date: {}                              ║",
            now.format("%Y-%m-%d %H:%M:%S UTC")
        );
        eprintln!("║ Platform: {:<49} ║", std::env::consts::ARCH);
        eprintln!("║ Engine:   {:<49} ║", SimdEngine::active().description());
        eprintln!("╚════════════════════════════════════════════════════════════╝\n");
    });
}

// ============================================================================
// Benchmarks
// ============================================================================

// Lengths around the 16-byte vector width, plus larger sizes for throughput.
const SIZES: [usize; 14] = [
    15, 16, 17, 32, 33, 63, 64, 75, 255, 256, 1023, 1024, 9999, 10000,
];

fn packed_source(len: usize) -> Vec<u8> {
    let mut src = alloc_with_slack(packed_len(len));
    for (i, byte) in src.iter_mut().enumerate() {
        *byte = (i * 3) as u8;
    }
    src
}

fn code_source(len: usize) -> Vec<u8> {
    let mut src = alloc_with_slack(len);
    for (i, byte) in src.iter_mut().enumerate() {
        *byte = ((i * 3) & 0x0F) as u8;
    }
    src
}

fn bench_unpack(c: &mut Criterion) {
    print_benchmark_header();
    let mut group = c.benchmark_group("unpack");

    for size in SIZES {
        let src = packed_source(size);
        let mut dst = alloc_with_slack(size);

        group.throughput(Throughput::Bytes(size as u64));

        group.bench_function(BenchmarkId::new("safe", size), |b| {
            b.iter(|| unpack_seq(black_box(&mut dst[..size]), black_box(&src)));
        });

        group.bench_function(BenchmarkId::new("unsafe", size), |b| {
            b.iter(|| unsafe { unpack_seq_unsafe(black_box(&mut dst), black_box(&src), size) });
        });

        group.bench_function(BenchmarkId::new("scalar", size), |b| {
            b.iter(|| unpack_seq_scalar(black_box(&mut dst[..size]), black_box(&src)));
        });
    }

    group.finish();
}

fn bench_pack(c: &mut Criterion) {
    let mut group = c.benchmark_group("pack");

    for size in SIZES {
        let src = code_source(size);
        let mut dst = alloc_with_slack(packed_len(size));

        group.throughput(Throughput::Bytes(size as u64));

        group.bench_function(BenchmarkId::new("safe", size), |b| {
            b.iter(|| pack_seq(black_box(&mut dst), black_box(&src[..size])));
        });

        group.bench_function(BenchmarkId::new("unsafe", size), |b| {
            b.iter(|| unsafe { pack_seq_unsafe(black_box(&mut dst), black_box(&src), size) });
        });

        group.bench_function(BenchmarkId::new("scalar", size), |b| {
            b.iter(|| pack_seq_scalar(black_box(&mut dst), black_box(&src[..size])));
        });
    }

    group.finish();
}

fn bench_unpack_and_replace(c: &mut Criterion) {
    let mut group = c.benchmark_group("unpack_and_replace");

    for size in SIZES {
        let src = packed_source(size);
        let mut dst = alloc_with_slack(size);

        group.throughput(Throughput::Bytes(size as u64));

        group.bench_function(BenchmarkId::new("safe", size), |b| {
            b.iter(|| {
                unpack_and_replace_seq(black_box(&mut dst[..size]), black_box(&src), &SEQ_NT16_TABLE)
            });
        });

        group.bench_function(BenchmarkId::new("unsafe", size), |b| {
            b.iter(|| unsafe {
                unpack_and_replace_seq_unsafe(
                    black_box(&mut dst),
                    black_box(&src),
                    &SEQ_NT16_TABLE,
                    size,
                )
            });
        });

        group.bench_function(BenchmarkId::new("scalar", size), |b| {
            b.iter(|| {
                unpack_and_replace_seq_scalar(
                    black_box(&mut dst[..size]),
                    black_box(&src),
                    &SEQ_NT16_TABLE,
                )
            });
        });
    }

    group.finish();
}

fn bench_clean_ascii(c: &mut Criterion) {
    let mut group = c.benchmark_group("clean_ascii");

    for size in SIZES {
        let mut buf = packed_source(2 * size);

        group.throughput(Throughput::Bytes(size as u64));

        group.bench_function(BenchmarkId::new("safe", size), |b| {
            b.iter(|| clean_ascii_seq_inplace(black_box(&mut buf[..size])));
        });

        group.bench_function(BenchmarkId::new("unsafe", size), |b| {
            b.iter(|| unsafe { clean_ascii_seq_inplace_unsafe(black_box(&mut buf), size) });
        });

        group.bench_function(BenchmarkId::new("scalar", size), |b| {
            b.iter(|| clean_ascii_seq_inplace_scalar(black_box(&mut buf[..size])));
        });
    }

    group.finish();
}

// ============================================================================
// Sharded Throughput Benchmarks
// ============================================================================

/// Worker counts to try; counts above the machine's parallelism are skipped.
fn cpu_counts() -> Vec<usize> {
    let max = rayon::current_num_threads();
    let mut counts = vec![1, 4, max];
    counts.retain(|&cpus| cpus <= max);
    counts.dedup();
    counts
}

fn bench_sharded(c: &mut Criterion) {
    let mut group = c.benchmark_group("sharded");
    group.sample_size(10);

    for (label, len, n_job) in [("short", SHORT_LEN, 100_000), ("long", LONG_LEN, 4)] {
        for cpus in cpu_counts() {
            let pool = build_pool(cpus);
            group.throughput(Throughput::Bytes((len * n_job) as u64));

            let mut shards: Vec<Shard> = (0..cpus).map(|_| Shard::for_unpack(len)).collect();
            group.bench_function(BenchmarkId::new(format!("unpack_{}", label), cpus), |b| {
                b.iter(|| {
                    run_sharded(&pool, &mut shards, n_job, |shard| unsafe {
                        unpack_seq_unsafe(&mut shard.dst, &shard.src, shard.len)
                    })
                });
            });

            let mut shards: Vec<Shard> = (0..cpus).map(|_| Shard::for_pack(len)).collect();
            group.bench_function(BenchmarkId::new(format!("pack_{}", label), cpus), |b| {
                b.iter(|| {
                    run_sharded(&pool, &mut shards, n_job, |shard| unsafe {
                        pack_seq_unsafe(&mut shard.dst, &shard.src, shard.len)
                    })
                });
            });

            let mut shards: Vec<Shard> = (0..cpus).map(|_| Shard::for_clean(len)).collect();
            group.bench_function(BenchmarkId::new(format!("clean_{}", label), cpus), |b| {
                b.iter(|| {
                    run_sharded(&pool, &mut shards, n_job, |shard| {
                        clean_ascii_seq_inplace(&mut shard.dst[..shard.len])
                    })
                });
            });
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_unpack,
    bench_pack,
    bench_unpack_and_replace,
    bench_clean_ascii,
    bench_sharded
);
criterion_main!(benches);
