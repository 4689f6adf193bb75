// Copyright (c) 2025-present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! # Table-Substituting Unpacker
//!
//! Unpacks nibble-packed codes and maps each one through a 16-entry table in a
//! single pass, so that displaying a packed sequence never materializes an
//! intermediate buffer of raw codes.
//!
//! The positional rules are those of [`unpack_seq`](crate::nibble_codec::unpack_seq):
//! `dst[2i] = table[src[i] >> 4]`, `dst[2i + 1] = table[src[i] & 0xF]`, and an
//! odd-length output takes only the high nibble of its final source byte.
//!
//! ## Standard Table
//!
//! [`SEQ_NT16_TABLE`] is the SAM/BAM 4-bit nucleotide alphabet:
//!
//! | Code | Base | Code | Base | Code | Base | Code | Base |
//! |------|------|------|------|------|------|------|------|
//! | 0x0  | =    | 0x4  | G    | 0x8  | T    | 0xC  | K    |
//! | 0x1  | A    | 0x5  | R    | 0x9  | W    | 0xD  | D    |
//! | 0x2  | C    | 0x6  | S    | 0xA  | Y    | 0xE  | B    |
//! | 0x3  | M    | 0x7  | V    | 0xB  | H    | 0xF  | N    |
//!
//! ## Example Usage
//!
//! ```rust
//! use biosimd::replace_unpacker::{unpack_and_replace_seq, SEQ_NT16_TABLE};
//!
//! let packed = [0x12, 0x48, 0xF0];
//! let mut bases = [0u8; 5];
//! unpack_and_replace_seq(&mut bases, &packed, &SEQ_NT16_TABLE);
//! assert_eq!(&bases, b"ACGTN");
//! ```
//!
//! ## Performance Considerations
//!
//! The vector path needs a byte-shuffle instruction (SSSE3 `pshufb` or NEON
//! `tbl`). On SSE2-only CPUs this module uses the scalar loop.

#![allow(unsafe_op_in_unsafe_fn)]

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

use crate::boundary::{drive_exact, drive_with_slack, packed_len, with_slack};
use crate::simd_engine::SimdEngine;

/// SAM/BAM 4-bit nucleotide alphabet (`seq_nt16_str`).
pub const SEQ_NT16_TABLE: [u8; 16] = *b"=ACMGRSVTWYHKDBN";

/// Unpacks `dst.len()` codes from `src`, writing `table[code]` for each.
///
/// Never reads or writes outside `dst` and `src[..ceil(dst.len() / 2)]`.
///
/// # Panics
///
/// Panics if `src` is shorter than `ceil(dst.len() / 2)` bytes.
pub fn unpack_and_replace_seq(dst: &mut [u8], src: &[u8], table: &[u8; 16]) {
    unpack_and_replace_seq_with(SimdEngine::active(), dst, src, table);
}

/// [`unpack_and_replace_seq`] on a given engine.
pub(crate) fn unpack_and_replace_seq_with(
    engine: SimdEngine,
    dst: &mut [u8],
    src: &[u8],
    table: &[u8; 16],
) {
    let len = dst.len();
    assert!(
        src.len() >= packed_len(len),
        "unpack_and_replace_seq: {} codes need {} source bytes, got {}",
        len,
        packed_len(len),
        src.len()
    );

    if engine.has_byte_shuffle() {
        unsafe { replace_exact(dst, src, table) };
    } else {
        unpack_and_replace_seq_scalar(dst, src, table);
    }
}

/// Unpacks and substitutes `len` codes, allowed to overrun both buffers by up
/// to one vector width.
///
/// After the call, `dst[..len]` matches what [`unpack_and_replace_seq`]
/// produces; `dst[len..]` holds unspecified bytes.
///
/// # Safety
///
/// - `dst.len()` must be at least [`with_slack`]`(len)`.
/// - `src.len()` must be at least [`with_slack`]`(packed_len(len))`.
///
/// Only checked in debug builds.
pub unsafe fn unpack_and_replace_seq_unsafe(
    dst: &mut [u8],
    src: &[u8],
    table: &[u8; 16],
    len: usize,
) {
    unpack_and_replace_seq_unsafe_with(SimdEngine::active(), dst, src, table, len);
}

/// [`unpack_and_replace_seq_unsafe`] on a given engine.
///
/// # Safety
///
/// Same contract as [`unpack_and_replace_seq_unsafe`].
pub(crate) unsafe fn unpack_and_replace_seq_unsafe_with(
    engine: SimdEngine,
    dst: &mut [u8],
    src: &[u8],
    table: &[u8; 16],
    len: usize,
) {
    debug_assert!(dst.len() >= with_slack(len));
    debug_assert!(src.len() >= with_slack(packed_len(len)));

    if engine.has_byte_shuffle() {
        replace_with_slack(dst, src, table, len);
    } else {
        unpack_and_replace_seq_scalar(dst.get_unchecked_mut(..len), src, table);
    }
}

/// Allocating form of [`unpack_and_replace_seq`].
///
/// ```rust
/// use biosimd::replace_unpacker::{unpack_and_replace_seq_to_vec, SEQ_NT16_TABLE};
///
/// assert_eq!(unpack_and_replace_seq_to_vec(&[0x12], &SEQ_NT16_TABLE, 2), b"AC");
/// ```
pub fn unpack_and_replace_seq_to_vec(src: &[u8], table: &[u8; 16], len: usize) -> Vec<u8> {
    let mut dst = vec![0u8; len];
    unpack_and_replace_seq(&mut dst, src, table);
    dst
}

/// Byte-at-a-time form with the same contract as [`unpack_and_replace_seq`].
///
/// # Panics
///
/// Panics if `src` is shorter than `ceil(dst.len() / 2)` bytes.
pub fn unpack_and_replace_seq_scalar(dst: &mut [u8], src: &[u8], table: &[u8; 16]) {
    let len = dst.len();
    assert!(
        src.len() >= packed_len(len),
        "unpack_and_replace_seq_scalar: source too short"
    );

    let mut pairs = dst.chunks_exact_mut(2);
    for (pair, &byte) in (&mut pairs).zip(src) {
        pair[0] = table[(byte >> 4) as usize];
        pair[1] = table[(byte & 0x0F) as usize];
    }
    if let [last] = pairs.into_remainder() {
        *last = table[(src[len / 2] >> 4) as usize];
    }
}

// ============================================================================
// x86 SSSE3 Implementation
// ============================================================================

/// Safe-variant driver.
///
/// # Safety
///
/// Requires SSSE3 and `src.len() >= packed_len(dst.len())`.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "ssse3")]
pub(crate) unsafe fn replace_exact(dst: &mut [u8], src: &[u8], table: &[u8; 16]) {
    let lut = _mm_loadu_si128(table.as_ptr() as *const __m128i);
    let dst_ptr = dst.as_mut_ptr();
    let src_ptr = src.as_ptr();
    let resume = drive_exact(dst.len(), 2, |pos| {
        replace_step_ssse3(dst_ptr.add(pos), src_ptr.add(pos / 2), lut)
    });
    unpack_and_replace_seq_scalar(&mut dst[resume..], &src[resume / 2..], table);
}

/// Unsafe-variant driver.
///
/// # Safety
///
/// Requires SSSE3 plus the slack preconditions of
/// [`unpack_and_replace_seq_unsafe`].
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "ssse3")]
unsafe fn replace_with_slack(dst: &mut [u8], src: &[u8], table: &[u8; 16], len: usize) {
    let lut = _mm_loadu_si128(table.as_ptr() as *const __m128i);
    let dst_ptr = dst.as_mut_ptr();
    let src_ptr = src.as_ptr();
    drive_with_slack(len, |pos| {
        replace_step_ssse3(dst_ptr.add(pos), src_ptr.add(pos / 2), lut)
    });
}

/// Writes 16 substituted codes to `dst` from 8 packed bytes at `src`.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "ssse3")]
#[inline]
unsafe fn replace_step_ssse3(dst: *mut u8, src: *const u8, lut: __m128i) {
    // Codes are 0..=15, so pshufb never hits its zeroing high bit.
    let codes = crate::nibble_codec::split_nibbles_sse2(src);
    _mm_storeu_si128(dst as *mut __m128i, _mm_shuffle_epi8(lut, codes));
}

// ============================================================================
// ARM NEON Implementation
// ============================================================================

/// Safe-variant driver. Requires `src.len() >= packed_len(dst.len())`.
#[cfg(target_arch = "aarch64")]
pub(crate) unsafe fn replace_exact(dst: &mut [u8], src: &[u8], table: &[u8; 16]) {
    let lut = vld1q_u8(table.as_ptr());
    let dst_ptr = dst.as_mut_ptr();
    let src_ptr = src.as_ptr();
    let resume = drive_exact(dst.len(), 2, |pos| {
        replace_step_neon(dst_ptr.add(pos), src_ptr.add(pos / 2), lut)
    });
    unpack_and_replace_seq_scalar(&mut dst[resume..], &src[resume / 2..], table);
}

#[cfg(target_arch = "aarch64")]
unsafe fn replace_with_slack(dst: &mut [u8], src: &[u8], table: &[u8; 16], len: usize) {
    let lut = vld1q_u8(table.as_ptr());
    let dst_ptr = dst.as_mut_ptr();
    let src_ptr = src.as_ptr();
    drive_with_slack(len, |pos| {
        replace_step_neon(dst_ptr.add(pos), src_ptr.add(pos / 2), lut)
    });
}

#[cfg(target_arch = "aarch64")]
#[inline(always)]
unsafe fn replace_step_neon(dst: *mut u8, src: *const u8, lut: uint8x16_t) {
    let nibbles = crate::nibble_codec::split_nibbles_neon(src);
    let zipped = vzip_u8(nibbles.0, nibbles.1);
    let codes = vcombine_u8(zipped.0, zipped.1);
    vst1q_u8(dst, vqtbl1q_u8(lut, codes));
}

// ============================================================================
// Portable Fixed-Width Implementation
// ============================================================================

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
pub(crate) unsafe fn replace_exact(dst: &mut [u8], src: &[u8], table: &[u8; 16]) {
    let dst_ptr = dst.as_mut_ptr();
    let src_ptr = src.as_ptr();
    let resume = drive_exact(dst.len(), 2, |pos| {
        replace_step_portable(dst_ptr.add(pos), src_ptr.add(pos / 2), table)
    });
    unpack_and_replace_seq_scalar(&mut dst[resume..], &src[resume / 2..], table);
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
unsafe fn replace_with_slack(dst: &mut [u8], src: &[u8], table: &[u8; 16], len: usize) {
    let dst_ptr = dst.as_mut_ptr();
    let src_ptr = src.as_ptr();
    drive_with_slack(len, |pos| {
        replace_step_portable(dst_ptr.add(pos), src_ptr.add(pos / 2), table)
    });
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
#[inline(always)]
unsafe fn replace_step_portable(dst: *mut u8, src: *const u8, table: &[u8; 16]) {
    for i in 0..crate::boundary::BYTES_PER_VEC / 2 {
        let byte = *src.add(i);
        *dst.add(2 * i) = table[(byte >> 4) as usize];
        *dst.add(2 * i + 1) = table[(byte & 0x0F) as usize];
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::BYTES_PER_VEC;
    use crate::nibble_codec::unpack_seq_to_vec;
    use crate::test_util::random_bytes;

    fn vector_path_available() -> bool {
        #[cfg(target_arch = "x86_64")]
        {
            is_x86_feature_detected!("ssse3")
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            true
        }
    }

    /// Tests decoding the standard table end to end.
    #[test]
    fn test_standard_table() {
        let packed = [0x01u8, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF];
        let decoded = unpack_and_replace_seq_to_vec(&packed, &SEQ_NT16_TABLE, 16);
        assert_eq!(&decoded, b"=ACMGRSVTWYHKDBN");
    }

    /// Tests the odd-length rule with a substitution table.
    #[test]
    fn test_odd_length() {
        let decoded = unpack_and_replace_seq_to_vec(&[0x12, 0x3F], &SEQ_NT16_TABLE, 3);
        assert_eq!(&decoded, b"ACM");
    }

    /// Tests that fused substitution equals unpack followed by lookup.
    #[test]
    fn test_fused_matches_two_pass() {
        let table: [u8; 16] = std::array::from_fn(|i| (i as u8).wrapping_mul(17) ^ 0xA5);
        for len in 0..300 {
            let src = random_bytes(packed_len(len), len as u64 + 13);
            let two_pass: Vec<u8> = unpack_seq_to_vec(&src, len)
                .into_iter()
                .map(|code| table[code as usize])
                .collect();
            assert_eq!(
                unpack_and_replace_seq_to_vec(&src, &table, len),
                two_pass,
                "len {}",
                len
            );
        }
    }

    /// Tests the vector path against the scalar reference.
    #[test]
    fn test_vector_matches_scalar() {
        if !vector_path_available() {
            return;
        }
        for len in 0..300 {
            let src = random_bytes(packed_len(len), len as u64 + 71);
            let mut expected = vec![0u8; len];
            unpack_and_replace_seq_scalar(&mut expected, &src, &SEQ_NT16_TABLE);
            let mut actual = vec![0u8; len];
            unsafe { replace_exact(&mut actual, &src, &SEQ_NT16_TABLE) };
            assert_eq!(actual, expected, "len {}", len);
        }
    }

    /// Tests every engine the CPU supports, including SSE2 without a byte
    /// shuffle, against scalar.
    #[test]
    fn test_every_engine_matches_scalar() {
        for engine in SimdEngine::supported() {
            for len in [0usize, 1, 15, 16, 17, 33, 75, 257] {
                let mut src = random_bytes(packed_len(len), len as u64 + 83);
                let mut expected = vec![0u8; len];
                unpack_and_replace_seq_scalar(&mut expected, &src, &SEQ_NT16_TABLE);

                let mut dst = vec![0u8; len];
                unpack_and_replace_seq_with(engine, &mut dst, &src, &SEQ_NT16_TABLE);
                assert_eq!(dst, expected, "{} len {}", engine, len);

                src.resize(with_slack(packed_len(len)), 0);
                let mut dst = vec![0u8; with_slack(len)];
                unsafe {
                    unpack_and_replace_seq_unsafe_with(
                        engine,
                        &mut dst,
                        &src,
                        &SEQ_NT16_TABLE,
                        len,
                    )
                };
                assert_eq!(&dst[..len], &expected[..], "{} unsafe len {}", engine, len);
            }
        }
    }

    /// Tests that the safe variant leaves the following byte alone.
    #[test]
    fn test_sentinel_untouched() {
        for len in 0..150 {
            let src = random_bytes(packed_len(len), len as u64 + 5);
            let mut backing = vec![0u8; len + 1];
            backing[len] = 0x3C;
            unpack_and_replace_seq(&mut backing[..len], &src, &SEQ_NT16_TABLE);
            assert_eq!(backing[len], 0x3C, "len {}", len);
        }
    }

    /// Tests unsafe output and its overrun bound.
    #[test]
    fn test_unsafe_matches_safe() {
        for len in 0..150 {
            let mut src = random_bytes(packed_len(len), len as u64 + 19);
            src.resize(with_slack(packed_len(len)), 0xFF);
            let mut dst = vec![0x77u8; with_slack(len) + BYTES_PER_VEC];
            unsafe { unpack_and_replace_seq_unsafe(&mut dst, &src, &SEQ_NT16_TABLE, len) };

            let expected =
                unpack_and_replace_seq_to_vec(&src[..packed_len(len)], &SEQ_NT16_TABLE, len);
            assert_eq!(&dst[..len], &expected[..], "len {}", len);
            assert!(dst[with_slack(len)..].iter().all(|&b| b == 0x77));
        }
    }
}
