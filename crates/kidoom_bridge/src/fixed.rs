//! # 16.16 Fixed-Point Arithmetic
//!
//! The renderer's world coordinates and projection scales arrive as 16.16
//! fixed-point integers. All bridge math stays in this format: no floating
//! point anywhere in the projection path, so results are deterministic and
//! bit-exact against the renderer's own arithmetic.

use std::ops::{Add, Sub};

/// Number of fractional bits in the renderer's fixed-point format.
pub const FRACBITS: u32 = 16;

/// One whole unit in fixed-point form.
pub const FRACUNIT: i32 = 1 << FRACBITS;

/// A 16.16 fixed-point value.
///
/// Internally stores `value * 65536` as an `i32`, matching the renderer's
/// `fixed_t`. Multiplication widens to 64 bits before shifting back down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Fixed(i32);

impl Fixed {
    /// Zero value.
    pub const ZERO: Self = Self(0);

    /// One whole unit.
    pub const ONE: Self = Self(FRACUNIT);

    /// Creates from a raw 16.16 bit pattern.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Creates from a whole number of world units.
    #[inline]
    #[must_use]
    pub const fn from_int(whole: i32) -> Self {
        Self(whole << FRACBITS)
    }

    /// Returns the raw 16.16 bit pattern.
    #[inline]
    #[must_use]
    pub const fn to_raw(self) -> i32 {
        self.0
    }

    /// Converts to whole pixels by dropping the fractional bits.
    ///
    /// Arithmetic right shift, exactly as the renderer's `>> FRACBITS`.
    #[inline]
    #[must_use]
    pub const fn to_int(self) -> i32 {
        self.0 >> FRACBITS
    }

    /// Fixed-point multiply with a 64-bit intermediate product.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn mul(self, rhs: Self) -> Self {
        Self((((self.0 as i64) * (rhs.0 as i64)) >> FRACBITS) as i32)
    }

    /// Returns true if the value is strictly positive.
    #[inline]
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl Add for Fixed {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl Sub for Fixed {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.wrapping_sub(rhs.0))
    }
}
