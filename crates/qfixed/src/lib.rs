//! Bit-accurate Q-notation fixed-point types.
//!
//! The rasterizer pipeline never touches a float: barycentric weights are
//! carried as unsigned fixed point with 24 fractional bits ([`UQ0_24`]), and
//! the various vertex-attribute formats elsewhere in the twin (depth, color)
//! are represented with this module's generic [`Fixed`] when a signed
//! integer-and-fraction split matters.

use std::fmt;
use std::ops::{Add, Neg, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Unsigned fixed point with `FRAC` fractional bits and no integer bits,
/// i.e. representing values in `[0, 1)` (plus the all-ones sentinel used by
/// the rasterizer's reciprocal, which is allowed to round up to exactly 1).
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UQ<const FRAC: u32>(u64);

/// UQ0.24 — the barycentric weight / area-reciprocal format used throughout
/// the edge walker and interpolator.
pub type UQ0_24 = UQ<24>;

impl<const FRAC: u32> UQ<FRAC> {
    pub const MASK: u64 = if FRAC >= 64 { u64::MAX } else { (1u64 << FRAC) - 1 };
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(Self::MASK.wrapping_add(1));

    /// Build from a raw fractional bit pattern, masked to `FRAC` bits.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw & Self::MASK)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Multiply by an 8-bit attribute, returning the full-width raw product
    /// (`FRAC + 8` significant bits). Rounding/truncation back down to an
    /// 8-bit or 16-bit result is the caller's job via [`round_shift`].
    pub const fn mul_u8(self, attr: u8) -> u64 {
        self.0 * attr as u64
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / (1u64 << FRAC) as f64
    }
}

impl<const FRAC: u32> fmt::Debug for UQ<FRAC> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UQ0.{}({:#x} ~= {})", FRAC, self.0, self.to_f64())
    }
}

/// Round-and-shift a sum of fixed-point products back down by `frac` bits,
/// using round-half-up (add half an LSB, then truncate). This is the single
/// rounding rule the interpolator applies uniformly to color and depth.
pub const fn round_shift(sum: u64, frac: u32) -> u64 {
    if frac == 0 {
        sum
    } else {
        (sum + (1 << (frac - 1))) >> frac
    }
}

/// Signed fixed point with `INT` integer bits and `FRAC` fractional bits,
/// stored in an `i64`. General-purpose Q-notation type for formats outside
/// the rasterizer's own UQ0.24 weights (e.g. a Q12.4 or Q1.15 attribute
/// arriving from an upstream transform stage).
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Fixed<const INT: u32, const FRAC: u32>(i64);

impl<const INT: u32, const FRAC: u32> Fixed<INT, FRAC> {
    const WIDTH: u32 = INT + FRAC;
    const MASK: i64 = if Self::WIDTH >= 64 { -1 } else { (1i64 << Self::WIDTH) - 1 };

    pub const ZERO: Self = Self(0);

    /// Build from a raw two's-complement bit pattern of `INT + FRAC` bits.
    pub fn from_raw(raw: i64) -> Self {
        let shift = 64 - Self::WIDTH as u32;
        Self((raw << shift) >> shift)
    }

    pub const fn raw(self) -> i64 {
        self.0 & Self::MASK
    }

    pub fn from_f64(value: f64) -> Self {
        let scaled = (value * (1i64 << FRAC) as f64).round() as i64;
        Self::from_raw(scaled)
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / (1i64 << FRAC) as f64
    }
}

impl<const INT: u32, const FRAC: u32> fmt::Debug for Fixed<INT, FRAC> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}.{}({})", INT, FRAC, self.to_f64())
    }
}

impl<const INT: u32, const FRAC: u32> Add for Fixed<INT, FRAC> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::from_raw(self.0 + rhs.0)
    }
}

impl<const INT: u32, const FRAC: u32> Sub for Fixed<INT, FRAC> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::from_raw(self.0 - rhs.0)
    }
}

impl<const INT: u32, const FRAC: u32> Neg for Fixed<INT, FRAC> {
    type Output = Self;
    fn neg(self) -> Self {
        Self::from_raw(-self.0)
    }
}
