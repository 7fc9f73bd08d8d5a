// vim: tw=80
//! Common utility functions used throughout zbd

use std::ops::{Add, Div, Rem, Sub};

/// Divide two unsigned numbers (usually integers), rounding up.
pub fn div_roundup<T>(dividend: T, divisor: T) -> T
    where T: Add<Output=T> + Copy + Div<Output=T> + From<u8> + Sub<Output=T>
{
    (dividend + divisor - T::from(1u8)) / divisor
}

/// Is `x` an exact multiple of `align`?
pub fn is_aligned<T>(x: T, align: T) -> bool
    where T: Copy + From<u8> + PartialEq + Rem<Output=T>
{
    x % align == T::from(0u8)
}

// LCOV_EXCL_STOP
