// Copyright (c) 2025-present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! # SIMD Engine Selection
//!
//! Picks the instruction set the transcoding kernels run on.
//!
//! | Engine   | Platform | Pack / Unpack / ASCII | Table substitution |
//! |----------|----------|-----------------------|--------------------|
//! | `Scalar` | any      | byte loop             | byte loop          |
//! | `Sse2`   | x86_64   | vector                | byte loop          |
//! | `Ssse3`  | x86_64   | vector                | vector (`pshufb`)  |
//! | `Neon`   | aarch64  | vector                | vector (`tbl`)     |
//!
//! SSE2 and NEON are baseline on their architectures; SSSE3 is detected at
//! runtime.
//!
//! ## Configuration
//!
//! The `BIOSIMD_ENGINE` environment variable overrides detection. Accepted
//! values (case-insensitive) are `auto`, `scalar`, `sse2`, `ssse3` and `neon`.
//! The variable is read once, on the first call to [`SimdEngine::active`]. An
//! unknown value, or an engine the CPU cannot run, is logged at `warn` level
//! and detection is used instead.
//!
//! ```rust
//! use biosimd::simd_engine::SimdEngine;
//!
//! let engine: SimdEngine = "scalar".parse().unwrap();
//! assert_eq!(engine, SimdEngine::Scalar);
//! assert!(!engine.is_vectorized());
//! assert!("avx9000".parse::<SimdEngine>().is_err());
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Environment variable consulted by [`SimdEngine::active`].
pub const ENGINE_ENV_VAR: &str = "BIOSIMD_ENGINE";

/// Instruction set used by the transcoding kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimdEngine {
    /// Portable byte-at-a-time loops.
    Scalar,
    /// 128-bit SSE2, always available on x86_64.
    #[cfg(target_arch = "x86_64")]
    Sse2,
    /// SSE2 plus the SSSE3 byte shuffle.
    #[cfg(target_arch = "x86_64")]
    Ssse3,
    /// 128-bit NEON, always available on aarch64.
    #[cfg(target_arch = "aarch64")]
    Neon,
}

static ACTIVE: OnceLock<SimdEngine> = OnceLock::new();

impl SimdEngine {
    /// Best engine supported by the running CPU.
    pub fn detect() -> SimdEngine {
        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("ssse3") {
                return SimdEngine::Ssse3;
            }
            SimdEngine::Sse2
        }

        #[cfg(target_arch = "aarch64")]
        {
            SimdEngine::Neon
        }

        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            SimdEngine::Scalar
        }
    }

    /// Engine used by every operation in this process.
    ///
    /// Resolved on first use from `BIOSIMD_ENGINE`, falling back to
    /// [`SimdEngine::detect`].
    pub fn active() -> SimdEngine {
        *ACTIVE.get_or_init(|| {
            let engine = Self::from_env();
            log::debug!("biosimd engine: {}", engine.description());
            engine
        })
    }

    fn from_env() -> SimdEngine {
        Self::resolve(std::env::var(ENGINE_ENV_VAR).ok().as_deref())
    }

    /// Engine selected by a `BIOSIMD_ENGINE` value, or by detection when the
    /// value is absent or cannot be honoured.
    pub(crate) fn resolve(value: Option<&str>) -> SimdEngine {
        let Some(value) = value else {
            return SimdEngine::detect();
        };
        match SimdEngine::from_name(value) {
            Ok(engine) => {
                log::info!("{}={}: using {} engine", ENGINE_ENV_VAR, value, engine.name());
                engine
            }
            Err(err) => {
                log::warn!("ignoring {}: {}", ENGINE_ENV_VAR, err);
                SimdEngine::detect()
            }
        }
    }

    /// Every engine the running CPU can execute, scalar first.
    pub fn supported() -> Vec<SimdEngine> {
        #[allow(unused_mut)]
        let mut engines = vec![SimdEngine::Scalar];
        #[cfg(target_arch = "x86_64")]
        {
            engines.push(SimdEngine::Sse2);
            if is_x86_feature_detected!("ssse3") {
                engines.push(SimdEngine::Ssse3);
            }
        }
        #[cfg(target_arch = "aarch64")]
        engines.push(SimdEngine::Neon);
        engines
    }

    /// Parses an engine name, checking that the running CPU supports it.
    ///
    /// `auto` resolves to [`SimdEngine::detect`].
    pub fn from_name(name: &str) -> Result<SimdEngine, EngineConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(SimdEngine::detect()),
            "scalar" => Ok(SimdEngine::Scalar),
            "sse2" => {
                #[cfg(target_arch = "x86_64")]
                {
                    Ok(SimdEngine::Sse2)
                }
                #[cfg(not(target_arch = "x86_64"))]
                {
                    Err(EngineConfigError::Unavailable("sse2"))
                }
            }
            "ssse3" => {
                #[cfg(target_arch = "x86_64")]
                {
                    if is_x86_feature_detected!("ssse3") {
                        Ok(SimdEngine::Ssse3)
                    } else {
                        Err(EngineConfigError::Unavailable("ssse3"))
                    }
                }
                #[cfg(not(target_arch = "x86_64"))]
                {
                    Err(EngineConfigError::Unavailable("ssse3"))
                }
            }
            "neon" => {
                #[cfg(target_arch = "aarch64")]
                {
                    Ok(SimdEngine::Neon)
                }
                #[cfg(not(target_arch = "aarch64"))]
                {
                    Err(EngineConfigError::Unavailable("neon"))
                }
            }
            other => Err(EngineConfigError::Unknown(other.to_string())),
        }
    }

    /// Short lowercase name, as accepted by [`SimdEngine::from_name`].
    pub fn name(self) -> &'static str {
        match self {
            SimdEngine::Scalar => "scalar",
            #[cfg(target_arch = "x86_64")]
            SimdEngine::Sse2 => "sse2",
            #[cfg(target_arch = "x86_64")]
            SimdEngine::Ssse3 => "ssse3",
            #[cfg(target_arch = "aarch64")]
            SimdEngine::Neon => "neon",
        }
    }

    /// Human-readable description of the engine.
    pub fn description(self) -> &'static str {
        match self {
            SimdEngine::Scalar => "scalar (byte at a time)",
            #[cfg(target_arch = "x86_64")]
            SimdEngine::Sse2 => "SSE2 (128-bit)",
            #[cfg(target_arch = "x86_64")]
            SimdEngine::Ssse3 => "SSSE3 (128-bit, byte shuffle)",
            #[cfg(target_arch = "aarch64")]
            SimdEngine::Neon => "NEON (128-bit, table lookup)",
        }
    }

    /// Whether pack, unpack and ASCII cleaning run on vector kernels.
    #[inline]
    pub fn is_vectorized(self) -> bool {
        !matches!(self, SimdEngine::Scalar)
    }

    /// Whether a 16-entry byte table lookup is available as a vector
    /// instruction, which fused unpack-and-replace needs.
    #[inline]
    pub fn has_byte_shuffle(self) -> bool {
        match self {
            SimdEngine::Scalar => false,
            #[cfg(target_arch = "x86_64")]
            SimdEngine::Sse2 => false,
            #[cfg(target_arch = "x86_64")]
            SimdEngine::Ssse3 => true,
            #[cfg(target_arch = "aarch64")]
            SimdEngine::Neon => true,
        }
    }
}

impl fmt::Display for SimdEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SimdEngine {
    type Err = EngineConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SimdEngine::from_name(s)
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Error returned when an engine name cannot be honoured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineConfigError {
    /// The name does not match any engine.
    Unknown(String),
    /// The engine exists but cannot run on this CPU or architecture.
    Unavailable(&'static str),
}

impl fmt::Display for EngineConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineConfigError::Unknown(name) => write!(
                f,
                "unknown engine '{}' (expected auto, scalar, sse2, ssse3 or neon)",
                name
            ),
            EngineConfigError::Unavailable(name) => {
                write!(f, "engine '{}' is not supported on this CPU", name)
            }
        }
    }
}

impl std::error::Error for EngineConfigError {}

// ============================================================================
// Unit Tests
// ============================================================================
