// Copyright (c) 2025-present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Safe vs unsafe equivalence fuzzing.
//!
//! The `_unsafe` variants must agree with the safe ones on the logical range
//! and never touch memory beyond one vector width of slack.

#![no_main]

use biosimd::{
    BYTES_PER_VEC, SEQ_NT16_TABLE, clean_ascii_seq_inplace, clean_ascii_seq_inplace_unsafe,
    pack_seq_to_vec, pack_seq_unsafe, packed_len, unpack_and_replace_seq_to_vec,
    unpack_and_replace_seq_unsafe, unpack_seq_to_vec, unpack_seq_unsafe, with_slack,
};
use libfuzzer_sys::fuzz_target;

const FAR: u8 = 0xC3;

/// Copies `data` into a buffer with slack plus one more vector of guard bytes.
fn padded(data: &[u8], fill: u8) -> Vec<u8> {
    let mut buf = data.to_vec();
    buf.resize(with_slack(data.len()), fill);
    buf.resize(with_slack(data.len()) + BYTES_PER_VEC, FAR);
    buf
}

fn check_far(buf: &[u8], logical: usize, op: &str) {
    assert!(
        buf[with_slack(logical)..].iter().all(|&b| b == FAR),
        "{} overran its slack (len {})",
        op,
        logical
    );
}

fuzz_target!(|data: &[u8]| {
    let len = 2 * data.len();

    // Unpack
    let expected = unpack_seq_to_vec(data, len);
    let src = padded(data, 0xFF);
    let mut dst = vec![0u8; with_slack(len) + BYTES_PER_VEC];
    dst[with_slack(len)..].fill(FAR);
    unsafe { unpack_seq_unsafe(&mut dst, &src, len) };
    assert_eq!(&dst[..len], &expected[..], "unpack_seq_unsafe mismatch");
    check_far(&dst, len, "unpack_seq_unsafe");

    // Unpack and replace
    let expected = unpack_and_replace_seq_to_vec(data, &SEQ_NT16_TABLE, len);
    dst.fill(0);
    dst[with_slack(len)..].fill(FAR);
    unsafe { unpack_and_replace_seq_unsafe(&mut dst, &src, &SEQ_NT16_TABLE, len) };
    assert_eq!(&dst[..len], &expected[..], "unpack_and_replace_seq_unsafe mismatch");
    check_far(&dst, len, "unpack_and_replace_seq_unsafe");

    // Pack
    let expected = pack_seq_to_vec(data);
    let src = padded(data, 0x0F);
    let out_len = packed_len(data.len());
    let mut dst = vec![0u8; with_slack(out_len) + BYTES_PER_VEC];
    dst[with_slack(out_len)..].fill(FAR);
    unsafe { pack_seq_unsafe(&mut dst, &src, data.len()) };
    assert_eq!(&dst[..out_len], &expected[..], "pack_seq_unsafe mismatch");
    check_far(&dst, out_len, "pack_seq_unsafe");

    // Clean
    let mut expected = data.to_vec();
    clean_ascii_seq_inplace(&mut expected);
    let mut buf = padded(data, b'c');
    unsafe { clean_ascii_seq_inplace_unsafe(&mut buf, data.len()) };
    assert_eq!(&buf[..data.len()], &expected[..], "clean_ascii_seq_inplace_unsafe mismatch");
    check_far(&buf, data.len(), "clean_ascii_seq_inplace_unsafe");
});
