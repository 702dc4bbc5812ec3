//! Bit layout of the IEEE 754 binary interchange formats.
//!
//! A [`Layout`] captures the field widths, masks and exponent range of one
//! binary width. Every other part of the crate works on bit patterns held in
//! a `u64` together with the `Layout` that describes them, so the parser and
//! formatter are written once for all widths.

/// IEEE 754 binary format parameters for bit manipulation.
///
/// Built with a `const fn` so every supported width is a compile-time
/// constant ([`BINARY16`], [`BINARY32`], [`BINARY64`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    /// Total bits in the format (16, 32 or 64)
    pub width: u32,
    /// Bits in the biased exponent field (5, 8 or 11)
    pub exponent_bits: u32,
    /// Stored significand bits, without the implicit leading one (10, 23 or 52)
    pub significand_bits: u32,
    /// Stored significand bits plus the implicit leading one
    pub significand_width: u32,
    pub sign_bit_mask: u64,
    pub exponent_bit_mask: u64,
    pub significand_bit_mask: u64,
    /// `2^(exponent_bits - 1) - 1`
    pub exponent_bias: i32,
    /// Largest unbiased exponent of a finite value
    pub max_exponent: i32,
    /// Smallest unbiased exponent of a normal value, `1 - max_exponent`
    pub min_exponent: i32,
}

impl Layout {
    pub const fn new(width: u32, exponent_bits: u32) -> Self {
        let significand_bits = width - exponent_bits - 1;
        let significand_bit_mask = (1_u64 << significand_bits) - 1;
        let exponent_bit_mask = ((1_u64 << exponent_bits) - 1) << significand_bits;
        let sign_bit_mask = 1_u64 << (width - 1);
        let exponent_bias = (1_i32 << (exponent_bits - 1)) - 1;

        Self {
            width,
            exponent_bits,
            significand_bits,
            significand_width: significand_bits + 1,
            sign_bit_mask,
            exponent_bit_mask,
            significand_bit_mask,
            exponent_bias,
            max_exponent: exponent_bias,
            min_exponent: 1 - exponent_bias,
        }
    }

    /// Mask covering every bit of the word.
    pub const fn word_mask(&self) -> u64 {
        if self.width == 64 {
            u64::MAX
        } else {
            (1_u64 << self.width) - 1
        }
    }

    /// True when sign, exponent and significand masks cover the word exactly
    /// once and the exponent range is symmetric around the bias.
    pub const fn partitions_word(&self) -> bool {
        let (s, e, m) = (self.sign_bit_mask, self.exponent_bit_mask, self.significand_bit_mask);
        s & e == 0
            && s & m == 0
            && e & m == 0
            && s | e | m == self.word_mask()
            && self.min_exponent == 1 - self.max_exponent
    }

    /// Biased exponent value reserved for infinities and NaNs.
    pub const fn exponent_all_ones(&self) -> u64 {
        (1_u64 << self.exponent_bits) - 1
    }

    pub const fn sign(&self, bits: u64) -> bool {
        bits & self.sign_bit_mask != 0
    }

    pub const fn biased_exponent(&self, bits: u64) -> u64 {
        (bits & self.exponent_bit_mask) >> self.significand_bits
    }

    pub const fn significand(&self, bits: u64) -> u64 {
        bits & self.significand_bit_mask
    }

    /// Assemble a bit pattern from its three fields.
    ///
    /// Fields wider than their slot are masked off.
    pub const fn compose(&self, negative: bool, biased_exponent: u64, significand: u64) -> u64 {
        let sign = if negative { self.sign_bit_mask } else { 0 };
        sign | ((biased_exponent << self.significand_bits) & self.exponent_bit_mask)
            | (significand & self.significand_bit_mask)
    }

    /// Clear the sign bit.
    pub const fn magnitude(&self, bits: u64) -> u64 {
        bits & !self.sign_bit_mask & self.word_mask()
    }

    pub const fn classify(&self, bits: u64) -> Category {
        let exponent = self.biased_exponent(bits);
        let significand = self.significand(bits);
        if exponent == 0 {
            if significand == 0 {
                Category::Zero
            } else {
                Category::Subnormal
            }
        } else if exponent == self.exponent_all_ones() {
            if significand == 0 {
                Category::Infinite
            } else {
                Category::Nan
            }
        } else {
            Category::Normal
        }
    }

    pub const fn is_finite(&self, bits: u64) -> bool {
        self.biased_exponent(bits) != self.exponent_all_ones()
    }

    pub const fn is_nan(&self, bits: u64) -> bool {
        matches!(self.classify(bits), Category::Nan)
    }

    pub const fn zero(&self, negative: bool) -> u64 {
        self.compose(negative, 0, 0)
    }

    pub const fn infinity(&self, negative: bool) -> u64 {
        self.compose(negative, self.exponent_all_ones(), 0)
    }

    /// The canonical quiet NaN: positive, top significand bit set.
    pub const fn quiet_nan(&self) -> u64 {
        self.compose(false, self.exponent_all_ones(), 1 << (self.significand_bits - 1))
    }

    /// Smallest positive subnormal.
    pub const fn min_value(&self) -> u64 {
        1
    }

    /// Smallest positive normal.
    pub const fn min_normal(&self) -> u64 {
        self.compose(false, 1, 0)
    }

    /// Largest finite value.
    pub const fn max_value(&self) -> u64 {
        self.compose(false, self.exponent_all_ones() - 1, self.significand_bit_mask)
    }
}

/// Classification of a bit pattern by its exponent and significand fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Zero,
    Subnormal,
    Normal,
    Infinite,
    Nan,
}

pub const BINARY16: Layout = Layout::new(16, 5);
pub const BINARY32: Layout = Layout::new(32, 8);
pub const BINARY64: Layout = Layout::new(64, 11);

const _: () = assert!(BINARY16.partitions_word());
const _: () = assert!(BINARY32.partitions_word());
const _: () = assert!(BINARY64.partitions_word());

/// A floating-point type with a fixed IEEE 754 binary layout.
///
/// The two reinterpretation primitives are the only place a value is viewed
/// as bits or bits as a value; everything else is mask arithmetic on the
/// `u64` form. This trait is sealed.
pub trait Ieee754: Copy + sealed::Sealed {
    const LAYOUT: Layout;

    /// The bit pattern of `self`, zero-extended to 64 bits.
    fn bits_of(self) -> u64;

    /// The value with bit pattern `bits`. Bits above the layout's width are
    /// ignored.
    fn value_of(bits: u64) -> Self;
}

pub(crate) mod sealed {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

impl Ieee754 for f32 {
    const LAYOUT: Layout = BINARY32;

    fn bits_of(self) -> u64 {
        u64::from(self.to_bits())
    }

    fn value_of(bits: u64) -> Self {
        f32::from_bits(bits as u32)
    }
}

impl Ieee754 for f64 {
    const LAYOUT: Layout = BINARY64;

    fn bits_of(self) -> u64 {
        self.to_bits()
    }

    fn value_of(bits: u64) -> Self {
        f64::from_bits(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_constants() {
        let cases: &[(Layout, u64, u64, u64, i32, i32, u32)] = &[
            (BINARY16, 0x8000, 0x7c00, 0x03ff, 15, -14, 11),
            (BINARY32, 0x8000_0000, 0x7f80_0000, 0x007f_ffff, 127, -126, 24),
            (
                BINARY64,
                0x8000_0000_0000_0000,
                0x7ff0_0000_0000_0000,
                0x000f_ffff_ffff_ffff,
                1023,
                -1022,
                53,
            ),
        ];
        for &(layout, sign, exponent, significand, bias, min_exp, width) in cases {
            assert_eq!(layout.sign_bit_mask, sign, "{:?}", layout);
            assert_eq!(layout.exponent_bit_mask, exponent, "{:?}", layout);
            assert_eq!(layout.significand_bit_mask, significand, "{:?}", layout);
            assert_eq!(layout.exponent_bias, bias);
            assert_eq!(layout.max_exponent, bias);
            assert_eq!(layout.min_exponent, min_exp);
            assert_eq!(layout.significand_width, width);
        }
    }

    #[test]
    fn test_boundary_patterns_match_std() {
        assert_eq!(BINARY64.max_value(), f64::MAX.to_bits());
        assert_eq!(BINARY64.min_normal(), f64::MIN_POSITIVE.to_bits());
        assert_eq!(BINARY64.infinity(true), f64::NEG_INFINITY.to_bits());
        assert_eq!(BINARY64.quiet_nan(), f64::NAN.to_bits());
        assert_eq!(BINARY32.max_value(), u64::from(f32::MAX.to_bits()));
        assert_eq!(BINARY32.min_normal(), u64::from(f32::MIN_POSITIVE.to_bits()));
        assert_eq!(BINARY32.quiet_nan(), u64::from(f32::NAN.to_bits()));
        assert_eq!(BINARY16.max_value(), 0x7bff);
        assert_eq!(BINARY16.quiet_nan(), 0x7e00);
    }

    #[test]
    fn test_classify() {
        let l = BINARY32;
        assert_eq!(l.classify(0), Category::Zero);
        assert_eq!(l.classify(0x8000_0000), Category::Zero);
        assert_eq!(l.classify(1), Category::Subnormal);
        assert_eq!(l.classify(0x0080_0000), Category::Normal);
        assert_eq!(l.classify(0x7f80_0000), Category::Infinite);
        assert_eq!(l.classify(0xff80_0000), Category::Infinite);
        assert_eq!(l.classify(0x7fc0_0000), Category::Nan);
        assert_eq!(l.classify(0x7f80_0001), Category::Nan);
    }

    #[test]
    fn test_fields_roundtrip() {
        let bits = (-3.5_f64).to_bits();
        let l = BINARY64;
        let (s, e, m) = (l.sign(bits), l.biased_exponent(bits), l.significand(bits));
        assert!(s);
        assert_eq!(e, 1024);
        assert_eq!(m, 0xc_0000_0000_0000);
        assert_eq!(l.compose(s, e, m), bits);
        assert_eq!(l.magnitude(bits), 3.5_f64.to_bits());
    }

    #[test]
    fn test_reinterpretation() {
        assert_eq!(1.0_f32.bits_of(), 0x3f80_0000);
        assert_eq!(f32::value_of(0x3f80_0000), 1.0);
        assert_eq!(f64::value_of(0x4008_0000_0000_0000), 3.0);
        assert_eq!((-0.0_f64).bits_of(), 0x8000_0000_0000_0000);
    }
}
