// Copyright (c) 2025-present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Boundary fuzzing for the safe variants.
//!
//! Runs every operation on a sub-slice at an input-chosen offset and checks
//! that the bytes on either side are left alone.

#![no_main]

use biosimd::{
    SEQ_NT16_TABLE, clean_ascii_seq_inplace, pack_seq, packed_len, unpack_and_replace_seq,
    unpack_seq,
};
use libfuzzer_sys::fuzz_target;

const GUARD: usize = 32;
const SENTINEL: u8 = 0x5A;

fuzz_target!(|data: &[u8]| {
    let Some((&offset, payload)) = data.split_first() else {
        return;
    };
    let start = offset as usize % GUARD;

    // Unpack: payload is the packed source. The top bit of the offset byte
    // selects an odd output length.
    let trim = usize::from(offset & 0x80 != 0);
    let len = (2 * payload.len()).saturating_sub(trim);
    let mut backing = vec![SENTINEL; start + len + GUARD];
    unpack_seq(&mut backing[start..start + len], payload);
    check_guards(&backing, start, len, "unpack_seq");

    let mut backing = vec![SENTINEL; start + len + GUARD];
    unpack_and_replace_seq(&mut backing[start..start + len], payload, &SEQ_NT16_TABLE);
    check_guards(&backing, start, len, "unpack_and_replace_seq");

    // Pack: payload is the code source.
    let out_len = packed_len(payload.len());
    let mut backing = vec![SENTINEL; start + out_len + GUARD];
    pack_seq(&mut backing[start..start + out_len], payload);
    check_guards(&backing, start, out_len, "pack_seq");

    // Clean: sentinel 'a' would change if touched.
    let mut backing = vec![b'a'; start + payload.len() + GUARD];
    backing[start..start + payload.len()].copy_from_slice(payload);
    clean_ascii_seq_inplace(&mut backing[start..start + payload.len()]);
    assert!(backing[..start].iter().all(|&b| b == b'a'), "clean wrote before start");
    assert!(
        backing[start + payload.len()..].iter().all(|&b| b == b'a'),
        "clean wrote past end"
    );
});

fn check_guards(backing: &[u8], start: usize, len: usize, op: &str) {
    assert!(
        backing[..start].iter().all(|&b| b == SENTINEL),
        "{} wrote before start (offset {})",
        op,
        start
    );
    assert!(
        backing[start + len..].iter().all(|&b| b == SENTINEL),
        "{} wrote past end (offset {}, len {})",
        op,
        start,
        len
    );
}
