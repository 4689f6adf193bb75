// Copyright (c) 2025-present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! ASCII cleaning fuzzing.
//!
//! Cleaned output only holds `ACGTN`, keeps every base (case-folded), and is a
//! fixed point of a second clean.

#![no_main]

use biosimd::clean_ascii_seq_inplace;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut once = data.to_vec();
    clean_ascii_seq_inplace(&mut once);

    for (i, (&raw, &clean)) in data.iter().zip(once.iter()).enumerate() {
        let expected = match raw.to_ascii_uppercase() {
            base @ (b'A' | b'C' | b'G' | b'T') => base,
            _ => b'N',
        };
        assert_eq!(
            clean, expected,
            "Mismatch at position {}: raw={:02X}, got={:02X}",
            i, raw, clean
        );
    }

    let mut twice = once.clone();
    clean_ascii_seq_inplace(&mut twice);
    assert_eq!(once, twice, "cleaning is not idempotent");
});
