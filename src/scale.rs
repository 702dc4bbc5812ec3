//! Neighbours, ulps and power-of-two scaling.
//!
//! Everything except [`Scale::scale_b`] is integer arithmetic on the bit
//! pattern, so signed zeros, subnormals and NaN payloads come out exactly.

use crate::layout::{Category, Ieee754, Layout};

/// Unbiased exponent of `x`.
///
/// Zeros and subnormals report `min_exponent - 1`; infinities and NaNs
/// report `max_exponent + 1`.
pub fn get_exponent<F: Ieee754>(x: F) -> i32 {
    exponent_of(&F::LAYOUT, x.bits_of())
}

fn exponent_of(layout: &Layout, bits: u64) -> i32 {
    layout.biased_exponent(bits) as i32 - layout.exponent_bias
}

/// Gap between `|x|` and the next value away from zero.
///
/// Zeros and subnormals have the smallest subnormal as their ulp. The ulp of
/// an infinity is positive infinity and the ulp of a NaN is that NaN with the
/// sign cleared.
pub fn ulp<F: Ieee754>(x: F) -> F {
    F::value_of(ulp_bits(&F::LAYOUT, x.bits_of()))
}

pub(crate) fn ulp_bits(layout: &Layout, bits: u64) -> u64 {
    match layout.classify(bits) {
        Category::Nan | Category::Infinite => layout.magnitude(bits),
        Category::Zero | Category::Subnormal => layout.min_value(),
        Category::Normal => {
            let exponent = exponent_of(layout, bits) - layout.significand_bits as i32;
            if exponent >= layout.min_exponent {
                layout.compose(false, (exponent + layout.exponent_bias) as u64, 0)
            } else {
                // The gap itself is subnormal.
                let smallest = layout.min_exponent - layout.significand_bits as i32;
                1 << (exponent - smallest)
            }
        }
    }
}

/// The least value greater than `x`.
///
/// Both zeros step to the smallest positive subnormal, `-MIN_VALUE` steps
/// to `-0.0` and the largest finite value steps to infinity. NaN and positive
/// infinity are returned unchanged.
pub fn next_up<F: Ieee754>(x: F) -> F {
    F::value_of(next_up_bits(&F::LAYOUT, x.bits_of()))
}

/// The greatest value less than `x`. Mirrors [`next_up`].
pub fn next_down<F: Ieee754>(x: F) -> F {
    F::value_of(next_down_bits(&F::LAYOUT, x.bits_of()))
}

pub(crate) fn next_up_bits(layout: &Layout, bits: u64) -> u64 {
    let negative = layout.sign(bits);
    match layout.classify(bits) {
        Category::Nan => bits,
        Category::Infinite if negative => layout.sign_bit_mask | layout.max_value(),
        Category::Infinite => bits,
        Category::Zero => layout.min_value(),
        _ if negative => bits - 1,
        _ => bits + 1,
    }
}

pub(crate) fn next_down_bits(layout: &Layout, bits: u64) -> u64 {
    let negative = layout.sign(bits);
    match layout.classify(bits) {
        Category::Nan => bits,
        Category::Infinite if negative => bits,
        Category::Infinite => layout.max_value(),
        Category::Zero => layout.sign_bit_mask | layout.min_value(),
        _ if negative => bits + 1,
        _ => bits - 1,
    }
}

/// `magnitude` with the sign bit of `sign`.
///
/// A bit operation rather than a multiply, so `copy_sign(1.0, -0.0)` is
/// `-1.0` and NaN signs are copied as-is.
pub fn copy_sign<F: Ieee754>(magnitude: F, sign: F) -> F {
    let mask = F::LAYOUT.sign_bit_mask;
    F::value_of((magnitude.bits_of() & !mask) | (sign.bits_of() & mask))
}

/// Multiplication by an integral power of two, rounded once.
pub trait Scale: Ieee754 {
    /// `self * 2^n`, correctly rounded, without overflowing on the way for
    /// any `n`.
    #[must_use]
    fn scale_b(self, n: i32) -> Self;
}

/// Clamp for the scale factor: far enough to carry the smallest subnormal
/// past the largest finite value, and back.
const fn scale_limit(layout: &Layout) -> i32 {
    layout.max_exponent - layout.min_exponent + layout.significand_width as i32 + 1
}

const SCALE_CHUNK: i32 = 512;

impl Scale for f64 {
    fn scale_b(self, n: i32) -> f64 {
        let limit = scale_limit(&Self::LAYOUT);
        let mut n = n.clamp(-limit, limit);

        // The residual goes first: once the value is in the subnormal band
        // every later step is exact or the single rounding.
        let residual = n % SCALE_CHUNK;
        let mut value = self * power_of_two(residual);
        n -= residual;

        let (chunk, step) = if n < 0 {
            (power_of_two(-SCALE_CHUNK), -SCALE_CHUNK)
        } else {
            (power_of_two(SCALE_CHUNK), SCALE_CHUNK)
        };
        while n != 0 {
            value *= chunk;
            n -= step;
        }
        value
    }
}

impl Scale for f32 {
    fn scale_b(self, n: i32) -> f32 {
        let limit = scale_limit(&Self::LAYOUT);
        // Every f32 times 2^n for |n| within the limit is exact in f64, so the
        // narrowing cast is the only rounding.
        (f64::from(self) * power_of_two(n.clamp(-limit, limit))) as f32
    }
}

#[cfg(feature = "half")]
impl Scale for crate::Half {
    fn scale_b(self, n: i32) -> crate::Half {
        let limit = scale_limit(&Self::LAYOUT);
        let n = n.clamp(-limit, limit);
        // Exact in f32 for |n| within the limit; from_f32 rounds once.
        let layout = &f32::LAYOUT;
        let factor = f32::from_bits(((n + layout.exponent_bias) as u32) << layout.significand_bits);
        crate::Half::from_f32(self.to_f32() * factor)
    }
}

/// `2^n` for `n` in the normal range of f64.
fn power_of_two(n: i32) -> f64 {
    let layout = &f64::LAYOUT;
    debug_assert!((layout.min_exponent..=layout.max_exponent).contains(&n));
    f64::from_bits(((n + layout.exponent_bias) as u64) << layout.significand_bits)
}
