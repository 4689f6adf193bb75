// Copyright (c) 2025-present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! # Pack/Unpack Nibble Codec
//!
//! Converts between the *packed* representation (two 4-bit codes per byte) and
//! the *unpacked* representation (one code per byte, low nibble significant).
//!
//! ## Layout
//!
//! ```text
//! packed:    [ 0x12 ][ 0x30 ]
//!               │ │     │
//! unpacked:  [0x1][0x2][0x3]      (length 3: the final low nibble is dropped)
//! ```
//!
//! The high nibble comes first in sequence order. When the unpacked length is
//! odd, the last packed byte contributes only its high nibble, and packing an
//! odd-length buffer writes a zero low nibble.
//!
//! ## Variants
//!
//! | Function              | Boundary behaviour                                   |
//! |-----------------------|------------------------------------------------------|
//! | [`unpack_seq`]        | touches exactly `dst` and `src[..ceil(n/2)]`         |
//! | [`unpack_seq_unsafe`] | may touch `BYTES_PER_VEC` bytes past both ranges     |
//! | [`pack_seq`]          | touches exactly `src` and `dst[..ceil(m/2)]`         |
//! | [`pack_seq_unsafe`]   | may touch `BYTES_PER_VEC` bytes past both ranges     |
//!
//! Pack only looks at the low 4 bits of each unpacked byte; stray high bits are
//! ignored rather than rejected.
//!
//! ## Example Usage
//!
//! ```rust
//! use biosimd::nibble_codec::{pack_seq, unpack_seq};
//!
//! let packed = [0x12, 0x30];
//! let mut codes = [0u8; 3];
//! unpack_seq(&mut codes, &packed);
//! assert_eq!(codes, [0x1, 0x2, 0x3]);
//!
//! let mut repacked = [0xFFu8; 2];
//! pack_seq(&mut repacked, &codes);
//! assert_eq!(repacked, packed);
//! ```
//!
//! ## Thread Safety
//!
//! All functions are pure and may run concurrently on disjoint buffers.

#![allow(unsafe_op_in_unsafe_fn)]

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

use crate::boundary::{drive_exact, drive_with_slack, packed_len, with_slack};
use crate::simd_engine::SimdEngine;

/// Unpacks `dst.len()` codes from `src`, one code per output byte.
///
/// `dst[2i] = src[i] >> 4` and `dst[2i + 1] = src[i] & 0xF`. For an odd
/// `dst.len()` the last output takes the high nibble of `src[dst.len() / 2]`.
///
/// Never reads or writes outside `dst` and `src[..ceil(dst.len() / 2)]`.
///
/// # Panics
///
/// Panics if `src` is shorter than `ceil(dst.len() / 2)` bytes.
///
/// # Examples
///
/// ```rust
/// use biosimd::nibble_codec::unpack_seq;
///
/// let mut dst = [0u8; 2];
/// unpack_seq(&mut dst, &[0x34]);
/// assert_eq!(dst, [0x3, 0x4]);
/// ```
pub fn unpack_seq(dst: &mut [u8], src: &[u8]) {
    unpack_seq_with(SimdEngine::active(), dst, src);
}

/// [`unpack_seq`] on a given engine.
pub(crate) fn unpack_seq_with(engine: SimdEngine, dst: &mut [u8], src: &[u8]) {
    let len = dst.len();
    assert!(
        src.len() >= packed_len(len),
        "unpack_seq: {} codes need {} source bytes, got {}",
        len,
        packed_len(len),
        src.len()
    );

    if engine.is_vectorized() {
        unsafe { unpack_exact(dst, src) };
    } else {
        unpack_seq_scalar(dst, src);
    }
}

/// Unpacks `len` codes from `src` into `dst`, allowed to overrun both buffers
/// by up to one vector width.
///
/// `dst` and `src` are the slack-inclusive windows starting at the logical
/// output and input. After the call, `dst[..len]` matches what [`unpack_seq`]
/// produces; `dst[len..]` holds unspecified bytes.
///
/// # Safety
///
/// - `dst.len()` must be at least [`with_slack`]`(len)`.
/// - `src.len()` must be at least [`with_slack`]`(packed_len(len))`.
///
/// Only checked in debug builds.
pub unsafe fn unpack_seq_unsafe(dst: &mut [u8], src: &[u8], len: usize) {
    unpack_seq_unsafe_with(SimdEngine::active(), dst, src, len);
}

/// [`unpack_seq_unsafe`] on a given engine.
///
/// # Safety
///
/// Same contract as [`unpack_seq_unsafe`].
pub(crate) unsafe fn unpack_seq_unsafe_with(
    engine: SimdEngine,
    dst: &mut [u8],
    src: &[u8],
    len: usize,
) {
    debug_assert!(dst.len() >= with_slack(len), "unpack_seq_unsafe: dst lacks slack");
    debug_assert!(
        src.len() >= with_slack(packed_len(len)),
        "unpack_seq_unsafe: src lacks slack"
    );

    if engine.is_vectorized() {
        unpack_with_slack(dst, src, len);
    } else {
        unpack_seq_scalar(dst.get_unchecked_mut(..len), src);
    }
}

/// Packs `src.len()` codes into the first `ceil(src.len() / 2)` bytes of `dst`.
///
/// `dst[i] = (src[2i] << 4) | (src[2i + 1] & 0xF)`; for an odd `src.len()` the
/// final byte is `src[last] << 4` with a zero low nibble.
///
/// Never reads or writes outside `src` and `dst[..ceil(src.len() / 2)]`.
///
/// # Panics
///
/// Panics if `dst` is shorter than `ceil(src.len() / 2)` bytes.
///
/// # Examples
///
/// ```rust
/// use biosimd::nibble_codec::pack_seq;
///
/// let mut dst = [0u8; 2];
/// pack_seq(&mut dst, &[0x1, 0x2, 0x3]);
/// assert_eq!(dst, [0x12, 0x30]);
/// ```
pub fn pack_seq(dst: &mut [u8], src: &[u8]) {
    pack_seq_with(SimdEngine::active(), dst, src);
}

/// [`pack_seq`] on a given engine.
pub(crate) fn pack_seq_with(engine: SimdEngine, dst: &mut [u8], src: &[u8]) {
    let len = src.len();
    assert!(
        dst.len() >= packed_len(len),
        "pack_seq: {} codes need {} destination bytes, got {}",
        len,
        packed_len(len),
        dst.len()
    );

    if engine.is_vectorized() {
        unsafe { pack_exact(dst, src) };
    } else {
        pack_seq_scalar(dst, src);
    }
}

/// Packs `len` codes from `src` into `dst`, allowed to overrun both buffers by
/// up to one vector width.
///
/// After the call, `dst[..ceil(len / 2)]` matches what [`pack_seq`] produces,
/// including the zero low nibble of an odd-length tail.
///
/// # Safety
///
/// - `src.len()` must be at least [`with_slack`]`(len)`.
/// - `dst.len()` must be at least [`with_slack`]`(packed_len(len))`.
///
/// Only checked in debug builds.
pub unsafe fn pack_seq_unsafe(dst: &mut [u8], src: &[u8], len: usize) {
    pack_seq_unsafe_with(SimdEngine::active(), dst, src, len);
}

/// [`pack_seq_unsafe`] on a given engine.
///
/// # Safety
///
/// Same contract as [`pack_seq_unsafe`].
pub(crate) unsafe fn pack_seq_unsafe_with(
    engine: SimdEngine,
    dst: &mut [u8],
    src: &[u8],
    len: usize,
) {
    debug_assert!(src.len() >= with_slack(len), "pack_seq_unsafe: src lacks slack");
    debug_assert!(
        dst.len() >= with_slack(packed_len(len)),
        "pack_seq_unsafe: dst lacks slack"
    );

    if engine.is_vectorized() {
        pack_with_slack(dst, src, len);
    } else {
        pack_seq_scalar(dst, src.get_unchecked(..len));
    }
}

/// Allocating form of [`unpack_seq`].
pub fn unpack_seq_to_vec(src: &[u8], len: usize) -> Vec<u8> {
    let mut dst = vec![0u8; len];
    unpack_seq(&mut dst, src);
    dst
}

/// Allocating form of [`pack_seq`].
pub fn pack_seq_to_vec(src: &[u8]) -> Vec<u8> {
    let mut dst = vec![0u8; packed_len(src.len())];
    pack_seq(&mut dst, src);
    dst
}

// ============================================================================
// Scalar Reference Implementation
// ============================================================================

/// Byte-at-a-time unpack with the same contract as [`unpack_seq`].
///
/// # Panics
///
/// Panics if `src` is shorter than `ceil(dst.len() / 2)` bytes.
pub fn unpack_seq_scalar(dst: &mut [u8], src: &[u8]) {
    let len = dst.len();
    assert!(src.len() >= packed_len(len), "unpack_seq_scalar: source too short");

    let mut pairs = dst.chunks_exact_mut(2);
    for (pair, &byte) in (&mut pairs).zip(src) {
        pair[0] = byte >> 4;
        pair[1] = byte & 0x0F;
    }
    if let [last] = pairs.into_remainder() {
        *last = src[len / 2] >> 4;
    }
}

/// Byte-at-a-time pack with the same contract as [`pack_seq`].
///
/// # Panics
///
/// Panics if `dst` is shorter than `ceil(src.len() / 2)` bytes.
pub fn pack_seq_scalar(dst: &mut [u8], src: &[u8]) {
    let out_len = packed_len(src.len());
    assert!(dst.len() >= out_len, "pack_seq_scalar: destination too short");

    let mut pairs = src.chunks_exact(2);
    for (out, pair) in dst.iter_mut().zip(&mut pairs) {
        *out = (pair[0] << 4) | (pair[1] & 0x0F);
    }
    if let [last] = pairs.remainder() {
        dst[out_len - 1] = last << 4;
    }
}

// ============================================================================
// Vector Drivers
// ============================================================================

/// Vectorized safe unpack. Caller has checked `src.len() >= packed_len(dst.len())`.
pub(crate) unsafe fn unpack_exact(dst: &mut [u8], src: &[u8]) {
    let dst_ptr = dst.as_mut_ptr();
    let src_ptr = src.as_ptr();
    let resume = drive_exact(dst.len(), 2, |pos| {
        unpack_step(dst_ptr.add(pos), src_ptr.add(pos / 2))
    });
    unpack_seq_scalar(&mut dst[resume..], &src[resume / 2..]);
}

/// Vectorized unsafe unpack. Caller guarantees the slack preconditions.
pub(crate) unsafe fn unpack_with_slack(dst: &mut [u8], src: &[u8], len: usize) {
    let dst_ptr = dst.as_mut_ptr();
    let src_ptr = src.as_ptr();
    drive_with_slack(len, |pos| unpack_step(dst_ptr.add(pos), src_ptr.add(pos / 2)));
}

/// Vectorized safe pack. Caller has checked `dst.len() >= packed_len(src.len())`.
pub(crate) unsafe fn pack_exact(dst: &mut [u8], src: &[u8]) {
    let dst_ptr = dst.as_mut_ptr();
    let src_ptr = src.as_ptr();
    let resume = drive_exact(src.len(), 2, |pos| {
        pack_step(dst_ptr.add(pos / 2), src_ptr.add(pos))
    });
    pack_seq_scalar(&mut dst[resume / 2..], &src[resume..]);
}

/// Vectorized unsafe pack. Caller guarantees the slack preconditions.
pub(crate) unsafe fn pack_with_slack(dst: &mut [u8], src: &[u8], len: usize) {
    let dst_ptr = dst.as_mut_ptr();
    let src_ptr = src.as_ptr();
    drive_with_slack(len, |pos| pack_step(dst_ptr.add(pos / 2), src_ptr.add(pos)));
    // The trailing step paired the last code with a slack byte.
    if len % 2 == 1 {
        *dst_ptr.add(len / 2) = *src_ptr.add(len - 1) << 4;
    }
}

// ============================================================================
// x86 SSE2 Implementation
// ============================================================================

/// Splits 8 packed bytes into 16 codes, high nibble first.
///
/// Reads exactly 8 bytes from `src`.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
pub(crate) unsafe fn split_nibbles_sse2(src: *const u8) -> __m128i {
    let packed = _mm_loadl_epi64(src as *const __m128i);
    let low_mask = _mm_set1_epi8(0x0F);
    let high = _mm_and_si128(_mm_srli_epi16::<4>(packed), low_mask);
    let low = _mm_and_si128(packed, low_mask);
    _mm_unpacklo_epi8(high, low)
}

/// Writes 16 codes to `dst` from 8 packed bytes at `src`.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
unsafe fn unpack_step(dst: *mut u8, src: *const u8) {
    _mm_storeu_si128(dst as *mut __m128i, split_nibbles_sse2(src));
}

/// Writes 8 packed bytes to `dst` from 16 codes at `src`.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
unsafe fn pack_step(dst: *mut u8, src: *const u8) {
    let codes = _mm_loadu_si128(src as *const __m128i);
    let low_mask = _mm_set1_epi16(0x000F);
    // Each 16-bit lane holds [even, odd] codes, little-endian.
    let even = _mm_slli_epi16::<4>(_mm_and_si128(codes, low_mask));
    let odd = _mm_and_si128(_mm_srli_epi16::<8>(codes), low_mask);
    let packed = _mm_packus_epi16(_mm_or_si128(even, odd), _mm_setzero_si128());
    _mm_storel_epi64(dst as *mut __m128i, packed);
}

// ============================================================================
// ARM NEON Implementation
// ============================================================================

/// Splits 8 packed bytes into high and low nibble lanes.
///
/// Reads exactly 8 bytes from `src`.
#[cfg(target_arch = "aarch64")]
#[inline(always)]
pub(crate) unsafe fn split_nibbles_neon(src: *const u8) -> uint8x8x2_t {
    let packed = vld1_u8(src);
    uint8x8x2_t(vshr_n_u8::<4>(packed), vand_u8(packed, vdup_n_u8(0x0F)))
}

/// Writes 16 codes to `dst` from 8 packed bytes at `src`.
#[cfg(target_arch = "aarch64")]
#[inline(always)]
unsafe fn unpack_step(dst: *mut u8, src: *const u8) {
    // vst2 interleaves the two lanes: high, low, high, low, ...
    vst2_u8(dst, split_nibbles_neon(src));
}

/// Writes 8 packed bytes to `dst` from 16 codes at `src`.
#[cfg(target_arch = "aarch64")]
#[inline(always)]
unsafe fn pack_step(dst: *mut u8, src: *const u8) {
    let pairs = vld2_u8(src);
    let even = vshl_n_u8::<4>(pairs.0);
    let odd = vand_u8(pairs.1, vdup_n_u8(0x0F));
    vst1_u8(dst, vorr_u8(even, odd));
}

// ============================================================================
// Portable Fixed-Width Implementation
// ============================================================================

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
#[inline(always)]
unsafe fn unpack_step(dst: *mut u8, src: *const u8) {
    for i in 0..crate::boundary::BYTES_PER_VEC / 2 {
        let byte = *src.add(i);
        *dst.add(2 * i) = byte >> 4;
        *dst.add(2 * i + 1) = byte & 0x0F;
    }
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
#[inline(always)]
unsafe fn pack_step(dst: *mut u8, src: *const u8) {
    for i in 0..crate::boundary::BYTES_PER_VEC / 2 {
        *dst.add(i) = (*src.add(2 * i) << 4) | (*src.add(2 * i + 1) & 0x0F);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
