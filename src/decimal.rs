//! Exact decimal digit sequences.
//!
//! A [`Decimal`] holds `0.d1d2d3... * 10^decimal_point` with up to
//! [`MAX_DIGITS`] digits. Multiplying or dividing by powers of two is exact
//! within that bound, which is enough to hold the full expansion of every
//! binary64 value and its rounding midpoints. Digits past the bound are
//! dropped and remembered in `truncated`, which only matters for breaking
//! exact ties while parsing.

use crate::layout::Layout;

pub(crate) const MAX_DIGITS: usize = 800;

/// Largest shift applied in one step, so that `digit << shift` plus the carry
/// stays below `2^64`.
const MAX_SHIFT: u32 = 60;

#[derive(Clone)]
pub(crate) struct Decimal {
    pub(crate) digits: [u8; MAX_DIGITS],
    pub(crate) num_digits: usize,
    pub(crate) decimal_point: i32,
    pub(crate) truncated: bool,
}

impl Default for Decimal {
    fn default() -> Self {
        Self {
            digits: [0; MAX_DIGITS],
            num_digits: 0,
            decimal_point: 0,
            truncated: false,
        }
    }
}

impl Decimal {
    pub(crate) fn from_u64(mut value: u64) -> Self {
        let mut decimal = Self::default();
        let mut reversed = [0_u8; 20];
        let mut n = 0;
        while value > 0 {
            reversed[n] = (value % 10) as u8;
            value /= 10;
            n += 1;
        }
        for (slot, &digit) in decimal.digits.iter_mut().zip(reversed[..n].iter().rev()) {
            *slot = digit;
        }
        decimal.num_digits = n;
        decimal.decimal_point = n as i32;
        decimal.trim();
        decimal
    }

    pub(crate) fn digits(&self) -> &[u8] {
        &self.digits[..self.num_digits]
    }

    /// Append a significant digit. Digits past the capacity only mark the
    /// sequence as truncated.
    pub(crate) fn push_digit(&mut self, digit: u8) {
        debug_assert!(digit < 10);
        if self.num_digits < MAX_DIGITS {
            self.digits[self.num_digits] = digit;
            self.num_digits += 1;
        } else if digit != 0 {
            self.truncated = true;
        }
    }

    fn trim(&mut self) {
        while self.num_digits > 0 && self.digits[self.num_digits - 1] == 0 {
            self.num_digits -= 1;
        }
        if self.num_digits == 0 {
            self.decimal_point = 0;
        }
    }

    /// Multiply by `2^shift`, dividing when `shift` is negative.
    pub(crate) fn shift(&mut self, shift: i32) {
        if self.num_digits == 0 {
            return;
        }
        let mut remaining = shift.unsigned_abs();
        while remaining > 0 {
            let step = remaining.min(MAX_SHIFT);
            if shift > 0 {
                self.left_shift(step);
            } else {
                self.right_shift(step);
            }
            remaining -= step;
        }
    }

    fn left_shift(&mut self, shift: u32) {
        // Digits of the product, least significant first, written from the
        // back of a scratch buffer with room for the carry digits.
        let mut scratch = [0_u8; MAX_DIGITS + 20];
        let mut write = scratch.len();
        let mut carry: u64 = 0;
        for &digit in self.digits[..self.num_digits].iter().rev() {
            carry += u64::from(digit) << shift;
            let quotient = carry / 10;
            write -= 1;
            scratch[write] = (carry - 10 * quotient) as u8;
            carry = quotient;
        }
        while carry > 0 {
            let quotient = carry / 10;
            write -= 1;
            scratch[write] = (carry - 10 * quotient) as u8;
            carry = quotient;
        }

        let produced = scratch.len() - write;
        let kept = produced.min(MAX_DIGITS);
        if scratch[write + kept..].iter().any(|&d| d != 0) {
            self.truncated = true;
        }
        self.decimal_point += (produced - self.num_digits) as i32;
        self.digits[..kept].copy_from_slice(&scratch[write..write + kept]);
        self.num_digits = kept;
        self.trim();
    }

    fn right_shift(&mut self, shift: u32) {
        let mut read = 0;
        let mut write = 0;
        let mut n: u64 = 0;

        // Pull in leading digits until the quotient is nonzero.
        while n >> shift == 0 {
            if read >= self.num_digits {
                if n == 0 {
                    self.num_digits = 0;
                    self.decimal_point = 0;
                    return;
                }
                while n >> shift == 0 {
                    n *= 10;
                    read += 1;
                }
                break;
            }
            n = n * 10 + u64::from(self.digits[read]);
            read += 1;
        }
        self.decimal_point -= read as i32 - 1;

        let mask = (1_u64 << shift) - 1;
        while read < self.num_digits {
            let next = u64::from(self.digits[read]);
            self.digits[write] = (n >> shift) as u8;
            write += 1;
            n = (n & mask) * 10 + next;
            read += 1;
        }
        while n > 0 {
            let digit = (n >> shift) as u8;
            n &= mask;
            if write < MAX_DIGITS {
                self.digits[write] = digit;
                write += 1;
            } else if digit > 0 {
                self.truncated = true;
            }
            n *= 10;
        }
        self.num_digits = write;
        self.trim();
    }

    /// Whether rounding to `count` digits goes up, ties to even.
    fn should_round_up(&self, count: usize) -> bool {
        if count >= self.num_digits {
            return false;
        }
        if self.digits[count] == 5 && count + 1 == self.num_digits {
            // Exactly halfway, unless digits were dropped.
            if self.truncated {
                return true;
            }
            return count > 0 && self.digits[count - 1] % 2 == 1;
        }
        self.digits[count] >= 5
    }

    /// Round to `count` significant digits, nearest even.
    pub(crate) fn round(&mut self, count: usize) {
        if self.should_round_up(count) {
            self.round_up(count);
        } else {
            self.round_down(count);
        }
    }

    /// Truncate to `count` significant digits.
    pub(crate) fn round_down(&mut self, count: usize) {
        if count >= self.num_digits {
            return;
        }
        self.num_digits = count;
        self.trim();
    }

    /// Truncate to `count` significant digits and add one unit in the last
    /// kept place, carrying through nines.
    pub(crate) fn round_up(&mut self, count: usize) {
        if count >= self.num_digits {
            return;
        }
        for i in (0..count).rev() {
            if self.digits[i] < 9 {
                self.digits[i] += 1;
                self.num_digits = i + 1;
                return;
            }
        }
        // All nines: 0.999 becomes 1.000 one place up.
        self.digits[0] = 1;
        self.num_digits = 1;
        self.decimal_point += 1;
    }

    /// The integer part, rounded to nearest even. Saturates at `u64::MAX`.
    fn rounded_integer(&self) -> u64 {
        if self.decimal_point > 20 {
            return u64::MAX;
        }
        let point = self.decimal_point.max(0) as usize;
        let mut n: u64 = 0;
        let mut i = 0;
        while i < point && i < self.num_digits {
            n = n * 10 + u64::from(self.digits[i]);
            i += 1;
        }
        while i < point {
            n *= 10;
            i += 1;
        }
        if self.decimal_point >= 0 && self.should_round_up(point) {
            n += 1;
        }
        n
    }

    /// Convert to the nearest bit pattern of `layout`, ties to even.
    ///
    /// Consumes the digits: the sequence is shifted in place.
    pub(crate) fn to_bits(&mut self, layout: &Layout, negative: bool) -> u64 {
        // Binary shift that brings the decimal point one place closer to zero.
        const POWERS: [u32; 9] = [1, 3, 6, 9, 13, 16, 19, 23, 26];
        const MAX_POWER: u32 = 27;
        let shift_for = |point: i32| -> u32 {
            POWERS.get(point.unsigned_abs() as usize).copied().unwrap_or(MAX_POWER)
        };

        if self.num_digits == 0 || self.decimal_point < -330 {
            return layout.zero(negative);
        }
        if self.decimal_point > 310 {
            return layout.infinity(negative);
        }

        // Scale into [0.5, 1), tracking the binary exponent.
        let mut exponent: i32 = 0;
        while self.decimal_point > 0 {
            let n = shift_for(self.decimal_point);
            self.shift(-(n as i32));
            exponent += n as i32;
        }
        while self.decimal_point < 0 || (self.decimal_point == 0 && self.digits[0] < 5) {
            let n = shift_for(self.decimal_point);
            self.shift(n as i32);
            exponent -= n as i32;
        }

        // Now in [1, 2) * 2^exponent once the leading bit is counted.
        exponent -= 1;
        if exponent < layout.min_exponent {
            let n = layout.min_exponent - exponent;
            self.shift(-n);
            exponent += n;
        }
        if exponent > layout.max_exponent {
            return layout.infinity(negative);
        }

        self.shift(layout.significand_width as i32);
        let mut mantissa = self.rounded_integer();
        if mantissa == 2 << layout.significand_bits {
            mantissa >>= 1;
            exponent += 1;
            if exponent > layout.max_exponent {
                return layout.infinity(negative);
            }
        }

        let biased = if mantissa & (1 << layout.significand_bits) == 0 {
            0
        } else {
            (exponent + layout.exponent_bias) as u64
        };
        layout.compose(negative, biased, mantissa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{BINARY16, BINARY32, BINARY64};

    fn decimal(digits: &str, decimal_point: i32) -> Decimal {
        let mut d = Decimal::default();
        for c in digits.bytes() {
            d.push_digit(c - b'0');
        }
        d.decimal_point = decimal_point;
        d
    }

    fn render(d: &Decimal) -> (String, i32) {
        let digits = d.digits().iter().map(|&b| char::from(b'0' + b)).collect();
        (digits, d.decimal_point)
    }

    #[test]
    fn test_from_u64() {
        assert_eq!(render(&Decimal::from_u64(0)), (String::new(), 0));
        assert_eq!(render(&Decimal::from_u64(1200)), ("12".to_string(), 4));
        assert_eq!(render(&Decimal::from_u64(u64::MAX)), ("18446744073709551615".to_string(), 20));
    }

    #[test]
    fn test_shifts_are_exact() {
        let mut d = Decimal::from_u64(5);
        d.shift(-3);
        assert_eq!(render(&d), ("625".to_string(), 0));
        d.shift(3);
        assert_eq!(render(&d), ("5".to_string(), 1));

        let mut d = Decimal::from_u64(1);
        d.shift(100);
        assert_eq!(
            render(&d),
            ("1267650600228229401496703205376".to_string(), 31)
        );
        d.shift(-100);
        assert_eq!(render(&d), ("1".to_string(), 1));

        // the smallest binary64 subnormal has 751 significant digits
        let mut d = Decimal::from_u64(1);
        d.shift(-1074);
        assert_eq!(d.num_digits, 751);
        assert_eq!(d.decimal_point, -323);
        assert_eq!(&d.digits()[..4], &[4, 9, 4, 0]);
        assert!(!d.truncated);
    }

    #[test]
    fn test_rounding() {
        let mut d = decimal("12345", 3);
        d.round(3);
        assert_eq!(render(&d), ("123".to_string(), 3));

        let mut d = decimal("125", 3);
        d.round(2);
        assert_eq!(render(&d), ("12".to_string(), 3));

        let mut d = decimal("135", 3);
        d.round(2);
        assert_eq!(render(&d), ("14".to_string(), 3));

        let mut d = decimal("125", 3);
        d.truncated = true;
        d.round(2);
        assert_eq!(render(&d), ("13".to_string(), 3));

        let mut d = decimal("9996", 1);
        d.round_up(3);
        assert_eq!(render(&d), ("1".to_string(), 2));

        let mut d = decimal("1996", 1);
        d.round_up(3);
        assert_eq!(render(&d), ("2".to_string(), 1));
    }

    #[test]
    fn test_to_bits() {
        let cases: &[(&str, i32, f64)] = &[
            ("1", 1, 1.0),
            ("1", 0, 0.1),
            ("3", 0, 0.3),
            ("123456789", 3, 123.456789),
            ("17976931348623157", 309, f64::MAX),
            ("22250738585072014", -307, f64::MIN_POSITIVE),
            ("5", -323, 5e-324),
            ("9007199254740993", 16, 9007199254740992.0),
        ];
        for &(digits, point, expected) in cases {
            let bits = decimal(digits, point).to_bits(&BINARY64, false);
            assert_eq!(bits, expected.to_bits(), "0.{}e{}", digits, point);
        }
    }

    #[test]
    fn test_to_bits_saturates() {
        assert_eq!(decimal("18", 309).to_bits(&BINARY64, false), f64::INFINITY.to_bits());
        assert_eq!(decimal("1", 400).to_bits(&BINARY64, true), f64::NEG_INFINITY.to_bits());
        assert_eq!(decimal("24", -323).to_bits(&BINARY64, false), 0);
        // half of the smallest subnormal is 2.4703282292062327e-324
        assert_eq!(decimal("247", -323).to_bits(&BINARY64, false), 0);
        assert_eq!(decimal("25", -323).to_bits(&BINARY64, false), 1);
        assert_eq!(decimal("1", -400).to_bits(&BINARY64, true), 1 << 63);
        assert_eq!(decimal("", 0).to_bits(&BINARY64, false), 0);
    }

    #[test]
    fn test_to_bits_narrow_layouts() {
        assert_eq!(decimal("1", 0).to_bits(&BINARY32, false), u64::from(0.1_f32.to_bits()));
        assert_eq!(
            decimal("34028235", 39).to_bits(&BINARY32, false),
            u64::from(f32::MAX.to_bits())
        );
        assert_eq!(decimal("1", 1).to_bits(&BINARY16, false), 0x3c00);
        assert_eq!(decimal("65504", 5).to_bits(&BINARY16, false), 0x7bff);
        assert_eq!(decimal("6552", 5).to_bits(&BINARY16, false), 0x7c00);
        assert_eq!(decimal("59604645", -7).to_bits(&BINARY16, false), 0x0001);
    }
}
