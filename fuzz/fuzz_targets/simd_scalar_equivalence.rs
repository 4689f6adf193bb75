// Copyright (c) 2025-present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! SIMD vs Scalar equivalence fuzzing.
//!
//! Ensures the dispatched operations and the byte-at-a-time reference
//! implementations produce identical results.

#![no_main]

use biosimd::ascii_cleaner::clean_ascii_seq_inplace_scalar;
use biosimd::nibble_codec::{pack_seq_scalar, unpack_seq_scalar};
use biosimd::replace_unpacker::unpack_and_replace_seq_scalar;
use biosimd::{
    clean_ascii_seq_inplace, pack_seq, packed_len, unpack_and_replace_seq, unpack_seq,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // The first 16 bytes double as the substitution table.
    let mut table = [0u8; 16];
    for (slot, &byte) in table.iter_mut().zip(data) {
        *slot = byte;
    }

    for len in [2 * data.len(), (2 * data.len()).saturating_sub(1)] {
        let mut scalar = vec![0u8; len];
        let mut simd = vec![0u8; len];
        unpack_seq_scalar(&mut scalar, data);
        unpack_seq(&mut simd, data);
        assert_eq!(scalar, simd, "unpack mismatch for length {}", len);

        unpack_and_replace_seq_scalar(&mut scalar, data, &table);
        unpack_and_replace_seq(&mut simd, data, &table);
        assert_eq!(scalar, simd, "unpack_and_replace mismatch for length {}", len);
    }

    let mut scalar = vec![0u8; packed_len(data.len())];
    let mut simd = vec![0u8; packed_len(data.len())];
    pack_seq_scalar(&mut scalar, data);
    pack_seq(&mut simd, data);
    assert_eq!(scalar, simd, "pack mismatch for length {}", data.len());

    let mut scalar = data.to_vec();
    let mut simd = data.to_vec();
    clean_ascii_seq_inplace_scalar(&mut scalar);
    clean_ascii_seq_inplace(&mut simd);
    assert_eq!(scalar, simd, "clean mismatch for length {}", data.len());
});
