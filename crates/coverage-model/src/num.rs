// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Coverage Numeric Trait
//!
//! Unified numeric bounds for costs, penalties and objective values. The
//! solver stays generic over the signed integer type used for costs, while
//! cell ids and coordinates stay fixed-width.
//!
//! `CoverageNumeric` collects the bounds into a single alias:
//! - `PrimInt + Signed` for the arithmetic itself (saturating ops included),
//! - `FromPrimitive + ToPrimitive + Into<i64>` for conversions to cell counts,
//!   atomics and the wire format,
//! - `Send + Sync` for the parallel engines.
//!
//! Note: `i128` and `isize` are excluded because they do not convert into `i64`
//! losslessly.

use num_traits::{FromPrimitive, PrimInt, Signed, ToPrimitive};

/// A trait alias for signed integer types usable as costs in the solver.
/// In practice these are `i8`, `i16`, `i32` and `i64`.
pub trait CoverageNumeric:
    PrimInt
    + Signed
    + FromPrimitive
    + ToPrimitive
    + Into<i64>
    + std::fmt::Debug
    + std::fmt::Display
    + Send
    + Sync
    + 'static
{
    /// Converts a cell count into the numeric type, saturating at the
    /// maximum representable value.
    #[inline(always)]
    fn from_count(count: usize) -> Self {
        Self::from_usize(count).unwrap_or_else(Self::max_value)
    }
}

impl<T> CoverageNumeric for T where
    T: PrimInt
        + Signed
        + FromPrimitive
        + ToPrimitive
        + Into<i64>
        + std::fmt::Debug
        + std::fmt::Display
        + Send
        + Sync
        + 'static
{
}

#[cfg(test)]
mod tests {
    use super::CoverageNumeric;

    #[test]
    fn test_from_count_converts_small_values() {
        assert_eq!(<i64 as CoverageNumeric>::from_count(0), 0);
        assert_eq!(<i32 as CoverageNumeric>::from_count(42), 42);
    }

    #[test]
    fn test_from_count_saturates_on_overflow() {
        assert_eq!(<i8 as CoverageNumeric>::from_count(1_000), i8::MAX);
        assert_eq!(<i16 as CoverageNumeric>::from_count(usize::MAX), i16::MAX);
    }
}
