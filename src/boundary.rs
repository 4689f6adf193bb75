// Copyright (c) 2025-present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! # Boundary Policy
//!
//! Every transcoding operation in this crate comes in two flavours that differ
//! only in how they treat memory past the logical end of a buffer:
//!
//! | Variant  | Reads/writes outside the logical range          | Caller obligation               |
//! |----------|-------------------------------------------------|---------------------------------|
//! | safe     | never                                           | none beyond source sizing       |
//! | `_unsafe`| up to [`BYTES_PER_VEC`] bytes past each buffer  | allocate [`with_slack`] bytes   |
//!
//! Both variants produce byte-identical output inside the logical range.
//!
//! ## Vector Width
//!
//! [`BYTES_PER_VEC`] is the register width of the engines shipped by this crate
//! (128-bit SSE2/SSSE3 on x86_64, NEON on aarch64). Scalar-only builds keep the
//! same constant so that slack-padded allocations stay portable.
//!
//! ## Step Drivers
//!
//! Operations describe one vector of work as a *step* at an unpacked-side
//! position `pos`, covering `[pos, pos + BYTES_PER_VEC)`. The drivers here decide
//! where steps land:
//!
//! - `drive_exact` runs the bulk loop and then one overlapping step aligned to
//!   the logical end, so a safe variant never leaves the range.
//! - `drive_with_slack` runs the same bulk loop and then one trailing step past
//!   the last whole vector, relying on caller slack.
//!
//! ```rust
//! use biosimd::boundary::{alloc_with_slack, packed_len, with_slack, BYTES_PER_VEC};
//!
//! assert_eq!(packed_len(7), 4);
//! assert_eq!(with_slack(7), 7 + BYTES_PER_VEC);
//! assert_eq!(alloc_with_slack(7).len(), with_slack(7));
//! ```

/// Width in bytes of one vector register used by the kernels.
///
/// Unsafe variants may read and write up to this many bytes past the logical
/// end of every buffer they are handed.
pub const BYTES_PER_VEC: usize = 16;

/// Number of packed bytes needed to hold `len` codes (two per byte).
#[inline]
pub const fn packed_len(len: usize) -> usize {
    len.div_ceil(2)
}

/// Minimum backing length for a buffer of logical length `len` that is passed
/// to an `_unsafe` variant.
#[inline]
pub const fn with_slack(len: usize) -> usize {
    len + BYTES_PER_VEC
}

/// Allocates a zeroed buffer of [`with_slack`]`(len)` bytes.
///
/// The first `len` bytes are the logical region; the rest is scratch space the
/// unsafe variants are allowed to clobber.
pub fn alloc_with_slack(len: usize) -> Vec<u8> {
    vec![0u8; with_slack(len)]
}

/// Runs `step` over every whole vector of `[0, len)` and returns the position
/// just past the last one.
#[inline(always)]
fn bulk<F: FnMut(usize)>(len: usize, step: &mut F) -> usize {
    let full = len - len % BYTES_PER_VEC;
    let mut pos = 0;
    while pos < full {
        step(pos);
        pos += BYTES_PER_VEC;
    }
    full
}

/// Step driver for the safe variants.
///
/// Covers as much of `[0, len)` as possible with whole-vector steps that stay
/// inside the range. When `len` is not a multiple of the vector width, one
/// final step is re-issued at the highest `granule`-aligned start whose window
/// still fits, overlapping work already done. `granule` is 2 for nibble
/// operations so that the window starts on a packed byte boundary.
///
/// Returns the position from which the caller must finish with scalar code:
/// `0` when `len` is shorter than one vector, `len` when everything is done,
/// or a value in between when the aligned window ends before `len`.
#[inline(always)]
pub(crate) fn drive_exact<F: FnMut(usize)>(len: usize, granule: usize, mut step: F) -> usize {
    if len < BYTES_PER_VEC {
        return 0;
    }
    let full = bulk(len, &mut step);
    if full == len {
        return len;
    }
    let last = (len - BYTES_PER_VEC) / granule * granule;
    step(last);
    last + BYTES_PER_VEC
}

/// Step driver for the unsafe variants.
///
/// Shares the bulk loop with [`drive_exact`] but finishes a partial vector by
/// stepping past `len`, so it touches up to `BYTES_PER_VEC - 1` positions
/// beyond the logical end.
#[inline(always)]
pub(crate) fn drive_with_slack<F: FnMut(usize)>(len: usize, mut step: F) {
    let full = bulk(len, &mut step);
    if full < len {
        step(full);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
