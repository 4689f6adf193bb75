// Copyright (c) 2025-present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Tests for the sharded throughput harness used by the benchmarks.

#[path = "../benchmark/harness.rs"]
mod harness;

use biosimd::nibble_codec::{pack_seq_scalar, unpack_seq_scalar};
use biosimd::{
    clean_ascii_seq_inplace, pack_seq_unsafe, packed_len, unpack_seq_unsafe, with_slack,
};
use harness::{Shard, build_pool, run_sharded, shard_sizes};

#[test]
fn test_shard_sizes_even_split() {
    assert_eq!(shard_sizes(12, 4), vec![3, 3, 3, 3]);
}

#[test]
fn test_shard_sizes_remainder_goes_first() {
    assert_eq!(shard_sizes(10, 4), vec![3, 3, 2, 2]);
    assert_eq!(shard_sizes(3, 4), vec![1, 1, 1, 0]);
}

#[test]
fn test_shard_sizes_sum_to_job() {
    for n_job in [0usize, 1, 7, 50, 9999] {
        for cpus in 1..=9 {
            let sizes = shard_sizes(n_job, cpus);
            assert_eq!(sizes.len(), cpus);
            assert_eq!(sizes.iter().sum::<usize>(), n_job);
            let max = *sizes.iter().max().unwrap();
            let min = *sizes.iter().min().unwrap();
            assert!(max - min <= 1);
        }
    }
}

#[test]
#[should_panic(expected = "at least one shard")]
fn test_shard_sizes_zero_cpus() {
    shard_sizes(10, 0);
}

#[test]
fn test_shard_buffers_carry_slack() {
    let shard = Shard::for_unpack(75);
    assert_eq!(shard.dst.len(), with_slack(75));
    assert_eq!(shard.src.len(), with_slack(packed_len(75)));

    let shard = Shard::for_pack(75);
    assert_eq!(shard.src.len(), with_slack(75));
    assert_eq!(shard.dst.len(), with_slack(packed_len(75)));
}

/// Tests that every shard runs its own unpack to completion.
#[test]
fn test_sharded_unpack_each_shard_correct() {
    let cpus = 4;
    let pool = build_pool(cpus);
    let len = 75;
    let mut shards: Vec<Shard> = (0..cpus).map(|_| Shard::for_unpack(len)).collect();

    run_sharded(&pool, &mut shards, 9, |shard| unsafe {
        unpack_seq_unsafe(&mut shard.dst, &shard.src, shard.len)
    });

    for shard in &shards {
        let mut expected = vec![0u8; len];
        unpack_seq_scalar(&mut expected, &shard.src);
        assert_eq!(&shard.dst[..len], &expected[..]);
    }
}

/// Tests the long-buffer shape with an odd length.
#[test]
fn test_sharded_pack_long_buffer() {
    let cpus = 3;
    let pool = build_pool(cpus);
    let len = (1 << 16) + 7;
    let mut shards: Vec<Shard> = (0..cpus).map(|_| Shard::for_pack(len)).collect();

    run_sharded(&pool, &mut shards, 5, |shard| unsafe {
        pack_seq_unsafe(&mut shard.dst, &shard.src, shard.len)
    });

    for shard in &shards {
        let mut expected = vec![0u8; packed_len(len)];
        pack_seq_scalar(&mut expected, &shard.src[..len]);
        assert_eq!(&shard.dst[..packed_len(len)], &expected[..]);
    }
}

/// Tests that a shard with zero repetitions is left untouched.
#[test]
fn test_sharded_zero_rep_shard_untouched() {
    let cpus = 4;
    let pool = build_pool(cpus);
    let len = 40;
    let mut shards: Vec<Shard> = (0..cpus).map(|_| Shard::for_clean(len)).collect();
    let original = shards[3].dst.clone();

    // Three jobs over four shards: the last shard gets none.
    run_sharded(&pool, &mut shards, 3, |shard| {
        clean_ascii_seq_inplace(&mut shard.dst[..shard.len])
    });

    assert_eq!(shards[3].dst, original);
    for shard in &shards[..3] {
        assert!(shard.dst[..len].iter().all(|b| b"ACGTN".contains(b)));
    }
}

#[test]
fn test_run_sharded_counts_repetitions() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let pool = build_pool(4);
    let mut shards: Vec<Shard> = (0..4).map(|_| Shard::for_clean(8)).collect();
    let calls = AtomicUsize::new(0);

    run_sharded(&pool, &mut shards, 10, |_| {
        calls.fetch_add(1, Ordering::Relaxed);
    });

    assert_eq!(calls.load(Ordering::Relaxed), 10);
}
