// Copyright (c) 2025-present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Seeded random buffers shared by the unit tests.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// `len` random bytes, reproducible from `seed`.
pub(crate) fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut buf = vec![0u8; len];
    rng.fill_bytes(&mut buf);
    buf
}

/// `len` random 4-bit codes, reproducible from `seed`.
pub(crate) fn random_codes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen::<u8>() & 0x0F).collect()
}
