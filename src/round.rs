//! Round-to-nearest-even composition of bit patterns.
//!
//! Every path that ends up with more significant bits than a layout can
//! store (hex floats, radix integers, narrowing) funnels through
//! [`round_to_layout`], so the tie-break rule lives in one place.

use crate::layout::{Category, Layout};

/// Round `significand * 2^(exponent - 63)` to the nearest value of `layout`,
/// ties to even.
///
/// `significand` is left-aligned: bit 63 holds the leading one, so
/// `exponent` is the unbiased exponent of that leading one. `sticky` records
/// nonzero bits that were already shifted out below bit 0.
///
/// Exponents above the layout's range saturate to infinity; exponents below
/// it land in the subnormal band or flush to zero.
pub(crate) fn round_to_layout(
    layout: &Layout,
    negative: bool,
    significand: u64,
    exponent: i64,
    sticky: bool,
) -> u64 {
    if significand == 0 {
        return layout.zero(negative);
    }
    debug_assert_eq!(significand >> 63, 1, "significand must be left-aligned");

    if exponent > i64::from(layout.max_exponent) {
        return layout.infinity(negative);
    }

    let min_exponent = i64::from(layout.min_exponent);
    let width = i64::from(layout.significand_width);
    let normal = exponent >= min_exponent;

    // Leading bits that survive into the stored significand. Below the normal
    // range every step down costs one bit of precision.
    let keep = if normal {
        width
    } else {
        width - (min_exponent - exponent)
    };
    if keep < 0 {
        return layout.zero(negative);
    }

    let drop = 64 - keep as u32;
    let kept = if keep == 0 { 0 } else { significand >> drop };
    let rounded = (significand >> (drop - 1)) & 1 == 1;
    let sticky = sticky || significand & ((1_u64 << (drop - 1)) - 1) != 0;

    let round_up = rounded && (sticky || kept & 1 == 1);
    let mantissa = kept + u64::from(round_up);

    // The mantissa carries its leading one into the exponent field, so the
    // field holds the biased exponent minus one. A carry out of the top of the
    // mantissa bumps the exponent, up to infinity, or turns the largest
    // subnormal into the smallest normal.
    let field = if normal {
        (exponent + i64::from(layout.exponent_bias) - 1) as u64
    } else {
        0
    };
    let magnitude = (field << layout.significand_bits) + mantissa;
    let sign = if negative { layout.sign_bit_mask } else { 0 };
    sign | magnitude
}

/// Round an unsigned integer to `layout`.
pub(crate) fn round_integer(layout: &Layout, negative: bool, value: u64) -> u64 {
    if value == 0 {
        return layout.zero(negative);
    }
    let shift = value.leading_zeros();
    round_to_layout(layout, negative, value << shift, 63 - i64::from(shift), false)
}

/// Split a finite nonzero bit pattern into a left-aligned significand and the
/// unbiased exponent of its leading one.
pub(crate) fn unpack(layout: &Layout, bits: u64) -> (u64, i64) {
    let biased = layout.biased_exponent(bits);
    let stored = layout.significand(bits);
    let (significand, exponent) = if biased == 0 {
        (stored, i64::from(layout.min_exponent))
    } else {
        (
            stored | (1 << layout.significand_bits),
            biased as i64 - i64::from(layout.exponent_bias),
        )
    };
    debug_assert_ne!(significand, 0);
    let shift = significand.leading_zeros();
    let top = 63 - shift;
    (
        significand << shift,
        exponent - (i64::from(layout.significand_bits) - i64::from(top)),
    )
}

/// Convert a bit pattern between two layouts.
///
/// Widening is exact. Narrowing rounds to nearest even and saturates to
/// infinity or zero. NaNs stay NaN: the top payload bits are kept and the
/// quiet bit is set.
pub fn transcode(from: &Layout, to: &Layout, bits: u64) -> u64 {
    let negative = from.sign(bits);
    match from.classify(bits) {
        Category::Zero => to.zero(negative),
        Category::Infinite => to.infinity(negative),
        Category::Nan => {
            let payload = from.significand(bits);
            let payload = if to.significand_bits >= from.significand_bits {
                payload << (to.significand_bits - from.significand_bits)
            } else {
                payload >> (from.significand_bits - to.significand_bits)
            };
            let quiet = 1 << (to.significand_bits - 1);
            to.compose(negative, to.exponent_all_ones(), payload | quiet)
        }
        Category::Subnormal | Category::Normal => {
            let (significand, exponent) = unpack(from, bits);
            round_to_layout(to, negative, significand, exponent, false)
        }
    }
}
