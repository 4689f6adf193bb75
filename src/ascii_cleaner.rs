// Copyright (c) 2025-present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! # ASCII Sequence Cleaning
//!
//! Canonicalizes raw sequence text in place through [`CLEAN_ASCII_SEQ_TABLE`]:
//!
//! | Input       | Output |
//! |-------------|--------|
//! | `A`, `a`    | `A`    |
//! | `C`, `c`    | `C`    |
//! | `G`, `g`    | `G`    |
//! | `T`, `t`    | `T`    |
//! | anything else | `N`  |
//!
//! Every output byte is a fixed point of the table, so cleaning is idempotent.
//!
//! ```rust
//! use biosimd::ascii_cleaner::clean_ascii_seq_inplace;
//!
//! let mut seq = *b"acgTNx-u";
//! clean_ascii_seq_inplace(&mut seq);
//! assert_eq!(&seq, b"ACGTNNNN");
//! ```

#![allow(unsafe_op_in_unsafe_fn)]

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

use crate::boundary::{drive_exact, drive_with_slack, with_slack};
use crate::simd_engine::SimdEngine;

/// Byte emitted for anything that is not a recognized base.
pub const UNKNOWN_BASE: u8 = b'N';

/// 256-entry translation applied by [`clean_ascii_seq_inplace`].
pub static CLEAN_ASCII_SEQ_TABLE: [u8; 256] = build_clean_table();

const fn build_clean_table() -> [u8; 256] {
    let mut table = [UNKNOWN_BASE; 256];
    let bases = *b"ACGT";
    let mut i = 0;
    while i < bases.len() {
        let upper = bases[i];
        table[upper as usize] = upper;
        table[upper.to_ascii_lowercase() as usize] = upper;
        i += 1;
    }
    table
}

/// Cleans `buf` in place.
///
/// Never reads or writes outside `buf`.
pub fn clean_ascii_seq_inplace(buf: &mut [u8]) {
    clean_ascii_seq_inplace_with(SimdEngine::active(), buf);
}

/// [`clean_ascii_seq_inplace`] on a given engine.
pub(crate) fn clean_ascii_seq_inplace_with(engine: SimdEngine, buf: &mut [u8]) {
    if engine.is_vectorized() {
        unsafe { clean_exact(buf) };
    } else {
        clean_ascii_seq_inplace_scalar(buf);
    }
}

/// Cleans `buf[..len]` in place, allowed to read and rewrite up to one vector
/// width past `len`.
///
/// The overrun rewrites slack bytes with their cleaned values, so their
/// contents afterwards are unspecified.
///
/// # Safety
///
/// `buf.len()` must be at least [`with_slack`]`(len)`. Only checked in debug
/// builds.
pub unsafe fn clean_ascii_seq_inplace_unsafe(buf: &mut [u8], len: usize) {
    clean_ascii_seq_inplace_unsafe_with(SimdEngine::active(), buf, len);
}

/// [`clean_ascii_seq_inplace_unsafe`] on a given engine.
///
/// # Safety
///
/// Same contract as [`clean_ascii_seq_inplace_unsafe`].
pub(crate) unsafe fn clean_ascii_seq_inplace_unsafe_with(
    engine: SimdEngine,
    buf: &mut [u8],
    len: usize,
) {
    debug_assert!(
        buf.len() >= with_slack(len),
        "clean_ascii_seq_inplace_unsafe: buf lacks slack"
    );

    if engine.is_vectorized() {
        let ptr = buf.as_mut_ptr();
        drive_with_slack(len, |pos| clean_step(ptr.add(pos)));
    } else {
        clean_ascii_seq_inplace_scalar(buf.get_unchecked_mut(..len));
    }
}

/// Byte-at-a-time form of [`clean_ascii_seq_inplace`].
pub fn clean_ascii_seq_inplace_scalar(buf: &mut [u8]) {
    for byte in buf.iter_mut() {
        *byte = CLEAN_ASCII_SEQ_TABLE[*byte as usize];
    }
}

/// Vectorized safe cleaning. The overlapping final window is harmless because
/// cleaned bytes map to themselves.
pub(crate) unsafe fn clean_exact(buf: &mut [u8]) {
    let ptr = buf.as_mut_ptr();
    let resume = drive_exact(buf.len(), 1, |pos| clean_step(ptr.add(pos)));
    clean_ascii_seq_inplace_scalar(&mut buf[resume..]);
}

// ============================================================================
// x86 SSE2 Implementation
// ============================================================================

/// Cleans 16 bytes at `ptr` in place.
///
/// Setting bit 5 folds `A` onto `a` and so on; no other byte folds onto a
/// lowercase base, so one compare per base identifies both cases.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
unsafe fn clean_step(ptr: *mut u8) {
    let raw = _mm_loadu_si128(ptr as *const __m128i);
    let folded = _mm_or_si128(raw, _mm_set1_epi8(0x20));

    let mut hits = _mm_setzero_si128();
    let mut bases = _mm_setzero_si128();
    for base in *b"ACGT" {
        let eq = _mm_cmpeq_epi8(folded, _mm_set1_epi8(base.to_ascii_lowercase() as i8));
        hits = _mm_or_si128(hits, eq);
        bases = _mm_or_si128(bases, _mm_and_si128(eq, _mm_set1_epi8(base as i8)));
    }
    let unknown = _mm_andnot_si128(hits, _mm_set1_epi8(UNKNOWN_BASE as i8));
    _mm_storeu_si128(ptr as *mut __m128i, _mm_or_si128(bases, unknown));
}

// ============================================================================
// ARM NEON Implementation
// ============================================================================

/// Cleans 16 bytes at `ptr` in place.
#[cfg(target_arch = "aarch64")]
#[inline(always)]
unsafe fn clean_step(ptr: *mut u8) {
    let raw = vld1q_u8(ptr);
    let folded = vorrq_u8(raw, vdupq_n_u8(0x20));

    let mut out = vdupq_n_u8(UNKNOWN_BASE);
    for base in *b"ACGT" {
        let eq = vceqq_u8(folded, vdupq_n_u8(base.to_ascii_lowercase()));
        out = vbslq_u8(eq, vdupq_n_u8(base), out);
    }
    vst1q_u8(ptr, out);
}

// ============================================================================
// Portable Fixed-Width Implementation
// ============================================================================

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
#[inline(always)]
unsafe fn clean_step(ptr: *mut u8) {
    for i in 0..crate::boundary::BYTES_PER_VEC {
        let byte = ptr.add(i);
        *byte = CLEAN_ASCII_SEQ_TABLE[*byte as usize];
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::BYTES_PER_VEC;

    fn all_bytes_repeated(len: usize, offset: usize) -> Vec<u8> {
        (0..len).map(|i| ((i * 7 + offset) % 256) as u8).collect()
    }

    /// Tests the table contents.
    #[test]
    fn test_table_contents() {
        for (byte, &cleaned) in CLEAN_ASCII_SEQ_TABLE.iter().enumerate() {
            let expected = match byte as u8 {
                b'A' | b'a' => b'A',
                b'C' | b'c' => b'C',
                b'G' | b'g' => b'G',
                b'T' | b't' => b'T',
                _ => b'N',
            };
            assert_eq!(cleaned, expected, "byte 0x{:02X}", byte);
        }
    }

    /// Tests that RNA, IUPAC and gap characters all become `N`.
    #[test]
    fn test_non_acgt_become_n() {
        let mut seq = *b"UuRYSWKMBDHVN-.*\n ";
        clean_ascii_seq_inplace(&mut seq);
        assert!(seq.iter().all(|&b| b == b'N'));
    }

    /// Tests idempotence over every byte value.
    #[test]
    fn test_idempotent() {
        let mut once = all_bytes_repeated(1024, 3);
        clean_ascii_seq_inplace(&mut once);
        let mut twice = once.clone();
        clean_ascii_seq_inplace(&mut twice);
        assert_eq!(once, twice);
    }

    /// Tests every byte value at every vector lane against the table.
    #[test]
    fn test_vector_matches_scalar() {
        for len in 0..300 {
            let original = all_bytes_repeated(len, len);
            let mut expected = original.clone();
            clean_ascii_seq_inplace_scalar(&mut expected);
            let mut actual = original;
            unsafe { clean_exact(&mut actual) };
            assert_eq!(actual, expected, "len {}", len);
        }
    }

    /// Tests every engine the CPU supports against the table.
    #[test]
    fn test_every_engine_matches_scalar() {
        for engine in SimdEngine::supported() {
            for len in [0usize, 1, 15, 16, 17, 33, 75, 256, 300] {
                let original = all_bytes_repeated(len, len + 1);
                let mut expected = original.clone();
                clean_ascii_seq_inplace_scalar(&mut expected);

                let mut buf = original.clone();
                clean_ascii_seq_inplace_with(engine, &mut buf);
                assert_eq!(buf, expected, "{} len {}", engine, len);

                let mut buf = original;
                buf.resize(with_slack(len), b'x');
                unsafe { clean_ascii_seq_inplace_unsafe_with(engine, &mut buf, len) };
                assert_eq!(&buf[..len], &expected[..], "{} unsafe len {}", engine, len);
            }
        }
    }

    /// Tests that the safe variant leaves the following byte alone.
    #[test]
    fn test_sentinel_untouched() {
        for start in [0usize, 3, 16] {
            for len in 0..150 {
                let mut backing = all_bytes_repeated(start + len + 1, len + 11);
                // Lowercase sentinel: cleaning it would change it.
                backing[start + len] = b'g';
                clean_ascii_seq_inplace(&mut backing[start..start + len]);
                assert_eq!(backing[start + len], b'g', "len {}", len);
            }
        }
    }

    /// Tests unsafe output and its overrun bound.
    #[test]
    fn test_unsafe_matches_safe() {
        for len in 0..150 {
            let original = all_bytes_repeated(len, len + 5);
            let mut expected = original.clone();
            clean_ascii_seq_inplace(&mut expected);

            let mut buf = original;
            buf.resize(with_slack(len) + BYTES_PER_VEC, b'a');
            unsafe { clean_ascii_seq_inplace_unsafe(&mut buf, len) };
            assert_eq!(&buf[..len], &expected[..], "len {}", len);
            assert!(buf[with_slack(len)..].iter().all(|&b| b == b'a'));
        }
    }
}
