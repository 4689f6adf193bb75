// Copyright (c) 2025-present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! # biosimd
//!
//! SIMD transcoding primitives for nucleotide sequence buffers, with automatic
//! fallback to scalar implementations.
//!
//! ## Features
//!
//! - **Nibble packing**: two 4-bit codes per byte and back ([`nibble_codec`])
//! - **Fused table substitution**: unpack straight to display letters
//!   ([`replace_unpacker`])
//! - **ASCII cleaning**: fold raw sequence text onto `ACGTN` in place
//!   ([`ascii_cleaner`])
//! - **SIMD acceleration** on x86_64 (SSE2/SSSE3) and ARM64 (NEON), selected at
//!   runtime ([`simd_engine`])
//! - **Safe and `_unsafe` variants** of every operation ([`boundary`])
//!
//! ## Quick Start
//!
//! ```rust
//! use biosimd::{pack_seq_to_vec, unpack_and_replace_seq_to_vec, SEQ_NT16_TABLE};
//!
//! // Codes in the SAM/BAM 4-bit alphabet: A=1, C=2, G=4, T=8, N=15.
//! let codes = [1u8, 2, 4, 8, 15];
//! let packed = pack_seq_to_vec(&codes);
//! assert_eq!(packed, [0x12, 0x48, 0xF0]);
//!
//! let letters = unpack_and_replace_seq_to_vec(&packed, &SEQ_NT16_TABLE, codes.len());
//! assert_eq!(letters, b"ACGTN");
//! ```
//!
//! ## Safe and Unsafe Variants
//!
//! The safe functions never touch memory outside the slices they are given.
//! The `_unsafe` functions take slack-padded buffers plus a logical length and
//! may read and write up to [`BYTES_PER_VEC`] bytes past it, which removes all
//! scalar tail handling from the hot path:
//!
//! ```rust
//! use biosimd::{alloc_with_slack, packed_len, unpack_seq_unsafe, with_slack};
//!
//! let len = 5;
//! let mut src = vec![0u8; with_slack(packed_len(len))];
//! src[..3].copy_from_slice(&[0x12, 0x34, 0x50]);
//! let mut dst = alloc_with_slack(len);
//!
//! // SAFETY: both buffers carry one vector width of slack.
//! unsafe { unpack_seq_unsafe(&mut dst, &src, len) };
//! assert_eq!(&dst[..len], &[1, 2, 3, 4, 5]);
//! ```
//!
//! ## Configuration
//!
//! Set `BIOSIMD_ENGINE` to `scalar`, `sse2`, `ssse3` or `neon` to override CPU
//! detection. The choice is logged through the `log` facade.
//!
//! ## Thread Safety
//!
//! Every operation is a pure function of its arguments and may be called
//! concurrently on disjoint buffers.

pub mod ascii_cleaner;
pub mod boundary;
pub mod nibble_codec;
pub mod replace_unpacker;
pub mod simd_engine;

#[cfg(test)]
mod test_util;

pub use ascii_cleaner::{
    CLEAN_ASCII_SEQ_TABLE, clean_ascii_seq_inplace, clean_ascii_seq_inplace_unsafe,
};
pub use boundary::{BYTES_PER_VEC, alloc_with_slack, packed_len, with_slack};
pub use nibble_codec::{
    pack_seq, pack_seq_to_vec, pack_seq_unsafe, unpack_seq, unpack_seq_to_vec, unpack_seq_unsafe,
};
pub use replace_unpacker::{
    SEQ_NT16_TABLE, unpack_and_replace_seq, unpack_and_replace_seq_to_vec,
    unpack_and_replace_seq_unsafe,
};
pub use simd_engine::{EngineConfigError, SimdEngine};
