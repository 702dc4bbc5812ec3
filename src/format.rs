//! Decimal and hexadecimal formatting of bit patterns.
//!
//! Both formatters are total: every bit pattern of every layout has a text
//! form, and the text of a finite value parses back to the same bits.

use log::trace;

use crate::decimal::Decimal;
use crate::layout::{Category, Ieee754, Layout};

const HEX_DIGITS: &[u8] = b"0123456789abcdef";

/// Decimal exponents in `[-3, 7)` print in plain notation; everything else
/// is scientific.
const PLAIN_EXPONENTS: core::ops::Range<i32> = -3..7;

/// Fewest decimal digits that tell apart all values carrying a given number
/// of significant bits: the smallest `d` with `10^(d-1) > 2^p`.
const DECIMAL_PRECISION: [u8; 65] = precision_table();

const fn precision_table() -> [u8; 65] {
    let mut table = [0_u8; 65];
    let mut p = 0;
    while p < table.len() {
        let power_of_two = 1_u128 << p;
        let mut power_of_ten: u128 = 1;
        let mut digits = 1;
        while power_of_ten <= power_of_two {
            power_of_ten *= 10;
            digits += 1;
        }
        table[p] = digits;
        p += 1;
    }
    table
}

/// Upper bound on the decimal digits needed to round-trip a significand of
/// `binary_precision` bits.
pub fn decimal_precision(binary_precision: u32) -> u32 {
    u32::from(DECIMAL_PRECISION[binary_precision.min(64) as usize])
}

/// Number of significant bits in the significand of `bits`, from the leading
/// one to the lowest set bit. Zero for zeros, infinities and NaNs.
pub fn binary_precision(layout: &Layout, bits: u64) -> u32 {
    let significand = layout.significand(bits);
    match layout.classify(bits) {
        Category::Normal => {
            let significand = significand | (1 << layout.significand_bits);
            layout.significand_width - significand.trailing_zeros()
        }
        Category::Subnormal => 64 - significand.leading_zeros() - significand.trailing_zeros(),
        Category::Zero | Category::Infinite | Category::Nan => 0,
    }
}

/// Shortest decimal text that parses back to `bits`.
///
/// Plain notation (`123.45`, `0.001`, `1.0`) is used when the magnitude is
/// at least `1e-3` and below `1e7`; scientific notation (`1.0E7`, `5.0E-324`)
/// otherwise. Non-finite values print as `NaN`, `Infinity` and `-Infinity`.
pub fn format_decimal_bits(layout: &Layout, bits: u64) -> String {
    let mut buffer = String::with_capacity(layout.width as usize);

    let category = layout.classify(bits);
    if category == Category::Nan {
        buffer.push_str("NaN");
        return buffer;
    }
    if layout.sign(bits) {
        buffer.push('-');
    }
    match category {
        Category::Infinite => buffer.push_str("Infinity"),
        Category::Zero => buffer.push_str("0.0"),
        _ => {
            let digits = shortest_digits(layout, layout.magnitude(bits));
            debug_assert!(digits.num_digits as u32 <= decimal_precision(layout.significand_width));
            write_digits(&mut buffer, digits.digits(), digits.decimal_point);
        }
    }
    buffer
}

/// Canonical hexadecimal text of `bits`: `[-]0x1.<hex>p<exp>` for normals,
/// `[-]0x0.<hex>p<min exp>` for subnormals and `[-]0x0.0p0` for zeros.
/// Non-finite values print as in [`format_decimal_bits`].
pub fn format_hex_bits(layout: &Layout, bits: u64) -> String {
    let category = layout.classify(bits);
    if matches!(category, Category::Nan | Category::Infinite) {
        trace!("{bits:#x}: no hexadecimal form, printing decimal");
        return format_decimal_bits(layout, bits);
    }

    let mut buffer = String::with_capacity(layout.width as usize);
    if layout.sign(bits) {
        buffer.push('-');
    }
    buffer.push_str("0x");
    let exponent = match category {
        Category::Zero => {
            buffer.push_str("0.0p0");
            return buffer;
        }
        Category::Subnormal => {
            buffer.push('0');
            layout.min_exponent
        }
        _ => {
            buffer.push('1');
            layout.biased_exponent(bits) as i32 - layout.exponent_bias
        }
    };
    buffer.push('.');
    write_significand(&mut buffer, layout.significand(bits), layout);
    buffer.push('p');
    write_exponent(&mut buffer, exponent);
    buffer
}

/// Decimal text of a value of `F`. See [`format_decimal_bits`].
pub fn format_decimal<F: Ieee754>(value: F) -> String {
    format_decimal_bits(&F::LAYOUT, value.bits_of())
}

/// Hexadecimal text of a value of `F`. See [`format_hex_bits`].
pub fn format_hex<F: Ieee754>(value: F) -> String {
    format_hex_bits(&F::LAYOUT, value.bits_of())
}

/// The shortest digit sequence inside the rounding interval of a positive
/// finite nonzero value.
///
/// The interval runs between the midpoints to both neighbours and includes
/// its ends when the significand is even, since ties round to even. Among the
/// shortest candidates the one closest to the exact value wins.
fn shortest_digits(layout: &Layout, bits: u64) -> Decimal {
    let significand_bits = layout.significand_bits as i32;
    let biased = layout.biased_exponent(bits);
    let mut mantissa = layout.significand(bits);
    let mut exponent = biased as i32 - layout.exponent_bias;
    if biased == 0 {
        exponent += 1;
    } else {
        mantissa |= 1 << layout.significand_bits;
    }

    let mut digits = Decimal::from_u64(mantissa);
    digits.shift(exponent - significand_bits);

    // Integers whose trailing decimal zeros already exceed the gap between
    // neighbours cannot get any shorter.
    let trailing_zeros = digits.decimal_point - digits.num_digits as i32;
    if exponent > layout.min_exponent
        && 332 * trailing_zeros >= 100 * (exponent - significand_bits)
    {
        return digits;
    }

    let mut upper = Decimal::from_u64(mantissa * 2 + 1);
    upper.shift(exponent - significand_bits - 1);

    // The gap below a power of two is half the gap above it.
    let (lower_mantissa, lower_exponent) =
        if mantissa > 1 << layout.significand_bits || exponent == layout.min_exponent {
            (mantissa - 1, exponent)
        } else {
            (mantissa * 2 - 1, exponent - 1)
        };
    let mut lower = Decimal::from_u64(lower_mantissa * 2 + 1);
    lower.shift(lower_exponent - significand_bits - 1);

    let inclusive = mantissa % 2 == 0;

    // 0: digits match upper so far. 1: upper was one more at some digit,
    // followed by only 9s against 0s. 2: upper is clearly above any round-up.
    let mut upper_delta = 0_u8;
    let mut ui: i32 = 0;
    loop {
        // upper has the highest decimal point; align the others against it.
        let mi = ui - upper.decimal_point + digits.decimal_point;
        if mi >= digits.num_digits as i32 {
            break;
        }
        let li = ui - upper.decimal_point + lower.decimal_point;
        let l = if li >= 0 && (li as usize) < lower.num_digits {
            lower.digits[li as usize]
        } else {
            0
        };
        let m = if mi >= 0 { digits.digits[mi as usize] } else { 0 };
        let u = if (ui as usize) < upper.num_digits {
            upper.digits[ui as usize]
        } else {
            0
        };

        let ok_down = l != m || (inclusive && li + 1 == lower.num_digits as i32);
        if upper_delta == 0 && m + 1 < u {
            upper_delta = 2;
        } else if upper_delta == 0 && m != u {
            upper_delta = 1;
        } else if upper_delta == 1 && (m != 9 || u != 0) {
            upper_delta = 2;
        }
        let ok_up = upper_delta > 0
            && (inclusive || upper_delta > 1 || ui + 1 < upper.num_digits as i32);

        let count = (mi + 1) as usize;
        match (ok_down, ok_up) {
            (true, true) => digits.round(count),
            (true, false) => digits.round_down(count),
            (false, true) => digits.round_up(count),
            (false, false) => {
                ui += 1;
                continue;
            }
        }
        break;
    }
    digits
}

/// Lay out significant digits `0.d1d2... * 10^decimal_point`.
fn write_digits(buffer: &mut String, digits: &[u8], decimal_point: i32) {
    let push_digits = |buffer: &mut String, digits: &[u8]| {
        buffer.extend(digits.iter().map(|&d| char::from(b'0' + d)));
    };
    let push_zeros = |buffer: &mut String, n: i32| {
        buffer.extend((0..n).map(|_| '0'));
    };

    let exponent = decimal_point - 1;
    if PLAIN_EXPONENTS.contains(&exponent) {
        let point = decimal_point.max(0) as usize;
        if decimal_point <= 0 {
            buffer.push_str("0.");
            push_zeros(buffer, -decimal_point);
            push_digits(buffer, digits);
        } else if point >= digits.len() {
            push_digits(buffer, digits);
            push_zeros(buffer, decimal_point - digits.len() as i32);
            buffer.push_str(".0");
        } else {
            push_digits(buffer, &digits[..point]);
            buffer.push('.');
            push_digits(buffer, &digits[point..]);
        }
    } else {
        push_digits(buffer, &digits[..1]);
        buffer.push('.');
        if digits.len() > 1 {
            push_digits(buffer, &digits[1..]);
        } else {
            buffer.push('0');
        }
        buffer.push('E');
        write_exponent(buffer, exponent);
    }
}

/// Write the significand nibbles left-aligned, dropping trailing zero
/// nibbles but keeping at least one digit.
fn write_significand(buffer: &mut String, significand: u64, layout: &Layout) {
    let pad = (4 - layout.significand_bits % 4) % 4;
    let mut nibbles = (layout.significand_bits + pad) / 4;
    let mut significand = significand << pad;
    while nibbles > 1 && significand & 0xf == 0 {
        significand >>= 4;
        nibbles -= 1;
    }
    for i in (0..nibbles).rev() {
        let nibble = (significand >> (4 * i)) & 0xf;
        buffer.push(char::from(HEX_DIGITS[nibble as usize]));
    }
}

/// Write a signed decimal exponent, `-` only when negative.
///
/// Uses manual digit extraction instead of `format!()`; exponents never
/// exceed four digits.
fn write_exponent(buffer: &mut String, exponent: i32) {
    if exponent < 0 {
        buffer.push('-');
    }
    let mut magnitude = exponent.unsigned_abs();
    let mut reversed = [0_u8; 10];
    let mut n = 0;
    loop {
        reversed[n] = b'0' + (magnitude % 10) as u8;
        n += 1;
        magnitude /= 10;
        if magnitude == 0 {
            break;
        }
    }
    buffer.extend(reversed[..n].iter().rev().map(|&c| char::from(c)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{BINARY16, BINARY32, BINARY64};

    #[test]
    fn test_precision_table() {
        let cases: &[(u32, u32)] = &[
            (1, 2),
            (3, 2),
            (4, 3),
            (10, 5),
            (11, 5),
            (24, 9),
            (53, 17),
            (64, 21),
        ];
        for &(p, d) in cases {
            assert_eq!(decimal_precision(p), d, "{} bits", p);
        }
        for p in 1..=64 {
            // 10^(d-1) > 2^p >= 10^(d-2)
            let d = decimal_precision(p);
            assert!(10_u128.pow(d - 1) > 1 << p);
            assert!(10_u128.pow(d - 2) <= 1 << p);
        }
    }

    #[test]
    fn test_binary_precision() {
        assert_eq!(binary_precision(&BINARY64, 1.0_f64.to_bits()), 1);
        assert_eq!(binary_precision(&BINARY64, 3.0_f64.to_bits()), 2);
        assert_eq!(binary_precision(&BINARY64, 0.1_f64.to_bits()), 52);
        assert_eq!(binary_precision(&BINARY64, 1), 1);
        assert_eq!(binary_precision(&BINARY64, 0b1011_0000), 4);
        assert_eq!(binary_precision(&BINARY64, 0), 0);
        assert_eq!(binary_precision(&BINARY32, u64::from(f32::MAX.to_bits())), 24);
    }

    #[test]
    fn test_f64_to_decimal() {
        let cases: &[(f64, &str)] = &[
            (0.0, "0.0"),
            (-0.0, "-0.0"),
            (1.0, "1.0"),
            (-1.0, "-1.0"),
            (0.1, "0.1"),
            (0.1 + 0.2, "0.30000000000000004"),
            (100.0, "100.0"),
            (123.456, "123.456"),
            (-2.5, "-2.5"),
            (9999999.0, "9999999.0"),
            (1.0e7, "1.0E7"),
            (12345678.9, "1.23456789E7"),
            (0.001, "0.001"),
            (0.00099999, "9.9999E-4"),
            (0.0001, "1.0E-4"),
            (1.0e23, "1.0E23"),
            (9223372036854775808.0, "9.223372036854776E18"),
            (f64::MAX, "1.7976931348623157E308"),
            (f64::MIN, "-1.7976931348623157E308"),
            (f64::MIN_POSITIVE, "2.2250738585072014E-308"),
            (5e-324, "5.0E-324"),
            (8.98846567431158e307, "8.98846567431158E307"),
            (std::f64::consts::PI, "3.141592653589793"),
            (f64::INFINITY, "Infinity"),
            (f64::NEG_INFINITY, "-Infinity"),
            (f64::NAN, "NaN"),
        ];
        for &(value, expected) in cases {
            assert_eq!(format_decimal(value), expected, "{:e}", value);
        }
    }

    #[test]
    fn test_f32_to_decimal() {
        let cases: &[(f32, &str)] = &[
            (0.1, "0.1"),
            (1.0000001, "1.0000001"),
            (16777216.0, "1.6777216E7"),
            (f32::MAX, "3.4028235E38"),
            (f32::MIN_POSITIVE, "1.1754944E-38"),
            (1.0e-45, "1.0E-45"),
            (-0.0, "-0.0"),
            (f32::NAN, "NaN"),
        ];
        for &(value, expected) in cases {
            assert_eq!(format_decimal(value), expected, "{:e}", value);
        }
    }

    #[test]
    fn test_half_to_decimal() {
        let cases: &[(u64, &str)] = &[
            (0x3c00, "1.0"),
            (0xc000, "-2.0"),
            (0x7bff, "65500.0"),
            (0x0001, "6.0E-8"),
            (0x0400, "6.104E-5"),
            (0x2e66, "0.1"),
            (0x7c00, "Infinity"),
            (0x7e00, "NaN"),
        ];
        for &(bits, expected) in cases {
            assert_eq!(format_decimal_bits(&BINARY16, bits), expected, "{:#06x}", bits);
        }
    }

    #[test]
    fn test_short_forms_parse_back() {
        use crate::parse::parse_bits;

        // One digit is enough at the bottom of each range, and three for
        // binary16's largest value, whose neighbours are 32 apart.
        let cases: &[(&Layout, u64, &str)] = &[
            (&BINARY64, 1, "5.0E-324"),
            (&BINARY32, 1, "1.0E-45"),
            (&BINARY16, 0x7bff, "65500.0"),
            (&BINARY16, 0x0001, "6.0E-8"),
        ];
        for &(layout, bits, text) in cases {
            assert_eq!(format_decimal_bits(layout, bits), text);
            assert_eq!(parse_bits(layout, text), Ok(bits), "{}", text);
        }
        // The longer forms name the same values.
        assert_eq!(parse_bits(&BINARY64, "4.9E-324"), Ok(1));
        assert_eq!(parse_bits(&BINARY32, "1.4E-45"), Ok(1));
        assert_eq!(parse_bits(&BINARY16, "65504.0"), Ok(0x7bff));
    }

    #[test]
    fn test_round_up_carries_through_nines() {
        // 0.9999999999999999 is the largest double below 1.0; the next digit
        // past the shortest prefix carries all the way up.
        assert_eq!(format_decimal(0.9999999999999999_f64), "0.9999999999999999");
        assert_eq!(format_decimal(9.999999999999999e22_f64), "1.0E23");
        assert_eq!(format_decimal(99999.99_f32), "99999.99");
        assert_eq!(format_decimal(999999.94_f32), "999999.94");
    }

    #[test]
    fn test_f32_to_hex() {
        let cases: &[([u8; 4], &str)] = &[
            ([0x00, 0x00, 0x00, 0x80], "-0x0.0p0"),
            ([0x00, 0x00, 0x00, 0x00], "0x0.0p0"),
            ([0x01, 0x00, 0x80, 0xd8], "-0x1.000002p50"),
            ([0x01, 0x00, 0x80, 0xa6], "-0x1.000002p-50"),
            ([0x01, 0x00, 0x80, 0x58], "0x1.000002p50"),
            ([0x01, 0x00, 0x00, 0x7f], "0x1.000002p127"),
            ([0xb4, 0xa2, 0x11, 0x52], "0x1.234568p37"),
            ([0x99, 0x76, 0x96, 0xfe], "-0x1.2ced32p126"),
            ([0x03, 0x00, 0x00, 0x00], "0x0.000006p-126"),
            ([0x01, 0x00, 0x00, 0x80], "-0x0.000002p-126"),
            ([0xff, 0xff, 0x7f, 0x00], "0x0.fffffep-126"),
            ([0x00, 0x00, 0x80, 0x00], "0x1.0p-126"),
            ([0x00, 0x00, 0x80, 0x26], "0x1.0p-50"),
            ([0x00, 0x00, 0x80, 0x3f], "0x1.0p0"),
            ([0x00, 0x00, 0x80, 0xbf], "-0x1.0p0"),
            ([0xff, 0xff, 0x7f, 0x7f], "0x1.fffffep127"),
            ([0xa4, 0x70, 0x9d, 0x3f], "0x1.3ae148p0"),
            ([0x00, 0x00, 0x80, 0x7f], "Infinity"),
            ([0x00, 0x00, 0x80, 0xff], "-Infinity"),
            ([0x00, 0x00, 0xc0, 0x7f], "NaN"),
            ([0x01, 0x00, 0x80, 0x7f], "NaN"),
        ];
        for (bytes, expected) in cases {
            let value = f32::from_le_bytes(*bytes);
            assert_eq!(&format_hex(value), expected, "f32 {:?}", bytes);
        }
    }

    #[test]
    fn test_f64_to_hex() {
        let cases: &[(u64, &str)] = &[
            (0x8000_0000_0000_0000, "-0x0.0p0"),
            (0x43b0_0000_0000_0001, "0x1.0000000000001p60"),
            (0xc3b0_0000_0000_0001, "-0x1.0000000000001p60"),
            (0x9a70_0000_0000_0002, "-0x1.0000000000002p-600"),
            (0x0010_0000_0000_0003, "0x1.0000000000003p-1022"),
            (0x43c2_3456_789a_bcdf, "0x1.23456789abcdfp61"),
            (0x419d_6f34_5400_0000, "0x1.d6f3454p26"),
            (0x7fef_ffff_ffff_ffff, "0x1.fffffffffffffp1023"),
            (0x7fe0_0000_0000_0000, "0x1.0p1023"),
            (0x4008_0000_0000_0000, "0x1.8p1"),
            (0x0000_0000_0000_0001, "0x0.0000000000001p-1022"),
            (0x8000_0000_0000_0002, "-0x0.0000000000002p-1022"),
            (0x000f_ffff_ffff_ffff, "0x0.fffffffffffffp-1022"),
            (0x0008_0000_0000_0000, "0x0.8p-1022"),
            (0x7ff0_0000_0000_0000, "Infinity"),
            (0x7ff8_0000_0000_0000, "NaN"),
        ];
        for &(bits, expected) in cases {
            assert_eq!(format_hex_bits(&BINARY64, bits), expected, "{:#018x}", bits);
        }
    }

    #[test]
    fn test_half_to_hex() {
        assert_eq!(format_hex_bits(&BINARY16, 0x3c00), "0x1.0p0");
        assert_eq!(format_hex_bits(&BINARY16, 0x7bff), "0x1.ffcp15");
        assert_eq!(format_hex_bits(&BINARY16, 0x0001), "0x0.004p-14");
        assert_eq!(format_hex_bits(&BINARY16, 0x83ff), "-0x0.ffcp-14");
    }

    #[test]
    fn test_write_exponent() {
        let cases: &[(i32, &str)] = &[
            (0, "0"),
            (7, "7"),
            (-4, "-4"),
            (308, "308"),
            (-1074, "-1074"),
        ];
        for &(exponent, expected) in cases {
            let mut buffer = String::new();
            write_exponent(&mut buffer, exponent);
            assert_eq!(buffer, expected);
        }
    }
}
