// Copyright (c) 2025-present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Sharded throughput harness.
//!
//! Fans one job of `n_job` repetitions out over `cpus` workers, each owning an
//! independent destination/source pair, and joins them before returning. The
//! codec itself holds no shared state, so the shards never coordinate.

use biosimd::{alloc_with_slack, packed_len};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Repetitions per shard: an even split of `n_job`, with one extra for each
/// of the first `n_job % cpus` shards.
///
/// # Panics
///
/// Panics if `cpus` is zero.
pub fn shard_sizes(n_job: usize, cpus: usize) -> Vec<usize> {
    assert!(cpus > 0, "need at least one shard");
    let base = n_job / cpus;
    let remainder = n_job % cpus;
    (0..cpus)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}

/// Buffers owned by one worker. Both carry one vector width of slack so the
/// `_unsafe` variants can run on them.
pub struct Shard {
    /// Logical length of the unpacked side.
    pub len: usize,
    pub dst: Vec<u8>,
    pub src: Vec<u8>,
}

impl Shard {
    /// Packed source, unpacked destination of `len` codes.
    pub fn for_unpack(len: usize) -> Shard {
        let mut src = alloc_with_slack(packed_len(len));
        for (i, byte) in src.iter_mut().take(packed_len(len)).enumerate() {
            *byte = (i * 3) as u8;
        }
        Shard {
            len,
            dst: alloc_with_slack(len),
            src,
        }
    }

    /// Unpacked source of `len` codes, packed destination.
    pub fn for_pack(len: usize) -> Shard {
        let mut src = alloc_with_slack(len);
        for (i, byte) in src.iter_mut().take(len).enumerate() {
            *byte = ((i * 3) & 0x0F) as u8;
        }
        Shard {
            len,
            dst: alloc_with_slack(packed_len(len)),
            src,
        }
    }

    /// In-place ASCII buffer of `len` bytes held in `dst`.
    pub fn for_clean(len: usize) -> Shard {
        let mut dst = alloc_with_slack(len);
        for (i, byte) in dst.iter_mut().take(len).enumerate() {
            *byte = (i * 3) as u8;
        }
        Shard {
            len,
            dst,
            src: Vec::new(),
        }
    }
}

/// Builds a pool with one worker per shard.
pub fn build_pool(cpus: usize) -> ThreadPool {
    ThreadPoolBuilder::new()
        .num_threads(cpus)
        .thread_name(|i| format!("biosimd-shard-{}", i))
        .build()
        .expect("failed to build shard pool")
}

/// Runs `task` over every shard for its share of `n_job` repetitions and waits
/// for all of them.
///
/// Returns the sum of each shard's first output byte so the work cannot be
/// optimized away.
pub fn run_sharded<F>(pool: &ThreadPool, shards: &mut [Shard], n_job: usize, task: F) -> usize
where
    F: Fn(&mut Shard) + Sync,
{
    let sizes = shard_sizes(n_job, shards.len());
    pool.install(|| {
        shards
            .par_iter_mut()
            .zip(sizes)
            .map(|(shard, reps)| {
                for _ in 0..reps {
                    task(shard);
                }
                shard.dst.first().copied().unwrap_or(0) as usize
            })
            .sum()
    })
}
