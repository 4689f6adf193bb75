// Copyright (c) 2025-present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Round-trip fuzzing: pack -> unpack should reproduce the low nibble of every
//! input byte.

#![no_main]

use biosimd::{pack_seq_to_vec, packed_len, unpack_seq_to_vec};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let packed = pack_seq_to_vec(data);
    assert_eq!(packed.len(), packed_len(data.len()));

    if data.len() % 2 == 1 {
        assert_eq!(
            packed[packed.len() - 1] & 0x0F,
            0,
            "odd-length tail must carry a zero low nibble"
        );
    }

    let unpacked = unpack_seq_to_vec(&packed, data.len());
    for (i, (&original, &code)) in data.iter().zip(unpacked.iter()).enumerate() {
        assert_eq!(
            code,
            original & 0x0F,
            "Mismatch at position {}: original={:02X}, got={:02X}",
            i,
            original,
            code
        );
    }
});
