//! IEEE 754 binary16.

use core::fmt;
use core::str::FromStr;

use crate::error::Error;
use crate::format::format_decimal_bits;
use crate::layout::{sealed, Category, Ieee754, Layout, BINARY16, BINARY32, BINARY64};
use crate::parse::parse_bits;
use crate::round::transcode;

/// A 16-bit float, held as its bit pattern.
///
/// There is no arithmetic on `Half`: widen with [`Half::to_f32`], compute,
/// and narrow back with [`Half::from_f32`]. Equality and hashing compare bit
/// patterns, so `NaN == NaN` and `0.0 != -0.0`.
///
/// ```
/// use fconv::Half;
///
/// let h = Half::from_f32(0.1);
/// assert_eq!(h.to_bits(), 0x2e66);
/// assert_eq!(h.to_string(), "0.1");
/// assert_eq!(h.to_f32(), 0.099975586);
/// assert_eq!("65504".parse::<Half>().unwrap(), Half::MAX);
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Half(u16);

impl Half {
    pub const ZERO: Half = Half(0x0000);
    pub const NEG_ZERO: Half = Half(0x8000);
    pub const ONE: Half = Half(0x3c00);
    pub const INFINITY: Half = Half(0x7c00);
    pub const NEG_INFINITY: Half = Half(0xfc00);
    pub const NAN: Half = Half(0x7e00);
    /// Largest finite value, 65504.
    pub const MAX: Half = Half(0x7bff);
    pub const MIN: Half = Half(0xfbff);
    /// Smallest positive normal value, 2^-14.
    pub const MIN_POSITIVE: Half = Half(0x0400);
    /// Smallest positive subnormal value, 2^-24.
    pub const MIN_POSITIVE_SUBNORMAL: Half = Half(0x0001);
    /// Gap between 1.0 and the next larger value, 2^-10.
    pub const EPSILON: Half = Half(0x1400);

    pub const fn from_bits(bits: u16) -> Self {
        Half(bits)
    }

    pub const fn to_bits(self) -> u16 {
        self.0
    }

    /// Nearest `Half` to `value`, ties to even. Out-of-range values become
    /// infinities; NaNs stay NaN with their top payload bits.
    pub fn from_f32(value: f32) -> Self {
        Half(transcode(&BINARY32, &BINARY16, u64::from(value.to_bits())) as u16)
    }

    /// Nearest `Half` to `value`, rounded once.
    pub fn from_f64(value: f64) -> Self {
        Half(transcode(&BINARY64, &BINARY16, value.to_bits()) as u16)
    }

    /// Exact widening.
    pub fn to_f32(self) -> f32 {
        f32::from_bits(transcode(&BINARY16, &BINARY32, u64::from(self.0)) as u32)
    }

    /// Exact widening.
    pub fn to_f64(self) -> f64 {
        f64::from_bits(transcode(&BINARY16, &BINARY64, u64::from(self.0)))
    }

    pub fn classify(self) -> Category {
        BINARY16.classify(u64::from(self.0))
    }

    pub fn is_nan(self) -> bool {
        self.classify() == Category::Nan
    }

    pub fn is_infinite(self) -> bool {
        self.classify() == Category::Infinite
    }

    pub fn is_finite(self) -> bool {
        BINARY16.is_finite(u64::from(self.0))
    }

    pub fn is_sign_negative(self) -> bool {
        BINARY16.sign(u64::from(self.0))
    }
}

impl sealed::Sealed for Half {}

impl Ieee754 for Half {
    const LAYOUT: Layout = BINARY16;

    fn bits_of(self) -> u64 {
        u64::from(self.0)
    }

    fn value_of(bits: u64) -> Self {
        Half(bits as u16)
    }
}

impl From<Half> for f32 {
    fn from(value: Half) -> f32 {
        value.to_f32()
    }
}

impl From<Half> for f64 {
    fn from(value: Half) -> f64 {
        value.to_f64()
    }
}

impl fmt::Display for Half {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_decimal_bits(&BINARY16, u64::from(self.0)))
    }
}

impl fmt::Debug for Half {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Half({self})")
    }
}

impl FromStr for Half {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        parse_bits(&BINARY16, s).map(|bits| Half(bits as u16))
    }
}
