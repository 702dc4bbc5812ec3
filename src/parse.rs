//! Literal parser.
//!
//! Grammar, after an optional `+` or `-`:
//!
//! ```text
//! decimal      := digits ('.' digits?)? exponent? | '.' digits exponent?
//! exponent     := ('e'|'E') sign? digits
//! hexFloat     := ("0x"|"0X") hexDigits? ('.' hexDigits?)? ('p'|'P') sign? digits
//! radixInteger := ("0x"|"0X") hexDigits | ("0b"|"0B") binDigits | '0' octDigits
//! special      := "nan" | "inf" | "infinity"        (any letter case)
//! ```
//!
//! A hex float needs at least one hex digit on either side of the point. A
//! radix integer has neither a point nor an exponent.

use log::trace;

use crate::decimal::Decimal;
use crate::error::{Error, LiteralError, Result};
use crate::layout::{Ieee754, Layout};
use crate::round::{round_integer, round_to_layout};

/// Parse `text` into the bit pattern of `layout`, rounding to nearest even.
///
/// Values too large for the layout saturate to infinity and values too small
/// flush to zero or a subnormal; only grammar violations are errors.
pub fn parse_bits(layout: &Layout, text: &str) -> Result<u64> {
    if text.is_empty() {
        return Err(Error::malformed(text, 0, LiteralError::Empty));
    }

    let mut cursor = Cursor::new(text);
    let negative = cursor.eat_sign();
    if cursor.at_end() {
        return Err(cursor.error(LiteralError::MissingDigits));
    }

    let rest = cursor.rest();
    if let Some(bits) = special(layout, rest, negative) {
        trace!("{text:?}: special token");
        return Ok(bits);
    }

    match rest {
        [b'0', b'x' | b'X', body @ ..] => {
            cursor.advance(2);
            if body.iter().any(|b| matches!(b, b'.' | b'p' | b'P')) {
                trace!("{text:?}: hexadecimal float");
                parse_hex_float(&mut cursor, layout, negative)
            } else {
                trace!("{text:?}: base 16 integer");
                parse_radix_integer(&mut cursor, layout, negative, 16)
            }
        }
        [b'0', b'b' | b'B', ..] => {
            cursor.advance(2);
            trace!("{text:?}: base 2 integer");
            parse_radix_integer(&mut cursor, layout, negative, 2)
        }
        [b'0', _, ..] if !rest.iter().any(|b| matches!(b, b'.' | b'e' | b'E')) => {
            trace!("{text:?}: base 8 integer");
            parse_radix_integer(&mut cursor, layout, negative, 8)
        }
        _ => parse_decimal(&mut cursor, layout, negative),
    }
}

/// Parse `text` as a value of `F`. See [`parse_bits`].
pub fn parse_literal<F: Ieee754>(text: &str) -> Result<F> {
    parse_bits(&F::LAYOUT, text).map(F::value_of)
}

fn special(layout: &Layout, rest: &[u8], negative: bool) -> Option<u64> {
    if rest.eq_ignore_ascii_case(b"nan") {
        Some(layout.quiet_nan())
    } else if rest.eq_ignore_ascii_case(b"inf") || rest.eq_ignore_ascii_case(b"infinity") {
        Some(layout.infinity(negative))
    } else {
        None
    }
}

/// Byte cursor over a literal with one byte of lookahead.
///
/// Only ASCII bytes are ever consumed, so the position is always a char
/// boundary of the source text.
struct Cursor<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.bytes.len());
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn rest(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    fn eat(&mut self, byte: u8) -> bool {
        self.eat_either(byte, byte)
    }

    fn eat_either(&mut self, a: u8, b: u8) -> bool {
        match self.peek() {
            Some(c) if c == a || c == b => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    /// Consume an optional sign, returning true for `-`.
    fn eat_sign(&mut self) -> bool {
        if self.eat(b'-') {
            true
        } else {
            self.eat(b'+');
            false
        }
    }

    /// The value of the next byte as a digit of `radix`, without consuming it.
    fn digit(&self, radix: u32) -> Option<u32> {
        self.peek().and_then(|b| char::from(b).to_digit(radix))
    }

    fn error(&self, kind: LiteralError) -> Error {
        Error::malformed(self.text, self.pos, kind)
    }

    fn expect_end(&self) -> Result<()> {
        match self.text[self.pos..].chars().next() {
            None => Ok(()),
            Some(c) => Err(self.error(LiteralError::UnexpectedChar(c))),
        }
    }

    /// Optionally signed decimal exponent digits. Saturates rather than
    /// overflowing, which still drives the result to infinity or zero.
    fn exponent(&mut self) -> Result<i32> {
        let negative = self.eat_sign();
        let mut value: i32 = 0;
        let mut any = false;
        while let Some(d) = self.digit(10) {
            self.pos += 1;
            any = true;
            value = value.saturating_mul(10).saturating_add(d as i32);
        }
        if !any {
            return Err(self.error(LiteralError::MissingExponentDigits));
        }
        Ok(if negative { -value } else { value })
    }
}

/// Collects digits of a power-of-two radix into a left-aligned 64-bit
/// significand.
///
/// Once all 64 bits are filled, later digits only feed the sticky flag. The
/// caller skips leading zero digits, so the first digit pushed is nonzero and
/// its highest set bit lands within the top `bits_per_digit` bits.
struct BitAccumulator {
    bits: u64,
    free: u32,
    sticky: bool,
}

impl BitAccumulator {
    fn new() -> Self {
        Self {
            bits: 0,
            free: 64,
            sticky: false,
        }
    }

    fn is_empty(&self) -> bool {
        self.free == 64 && !self.sticky
    }

    fn push(&mut self, digit: u32, bits_per_digit: u32) {
        let digit = u64::from(digit);
        if self.free >= bits_per_digit {
            self.free -= bits_per_digit;
            self.bits |= digit << self.free;
        } else if self.free > 0 {
            let spill = bits_per_digit - self.free;
            self.bits |= digit >> spill;
            self.sticky |= digit & ((1 << spill) - 1) != 0;
            self.free = 0;
        } else {
            self.sticky |= digit != 0;
        }
    }

    /// Round the collected bits to `layout`. `top_exponent` is the binary
    /// exponent of bit 63 of the accumulator.
    fn finish(&self, layout: &Layout, negative: bool, top_exponent: i64) -> u64 {
        if self.bits == 0 {
            return layout.zero(negative);
        }
        // The leading digit's highest set bit sits in one of the top
        // `bits_per_digit` positions; normalizing moves it to bit 63.
        let shift = self.bits.leading_zeros();
        round_to_layout(
            layout,
            negative,
            self.bits << shift,
            top_exponent - i64::from(shift),
            self.sticky,
        )
    }
}

/// Hex float body, positioned just after `0x`.
fn parse_hex_float(cursor: &mut Cursor<'_>, layout: &Layout, negative: bool) -> Result<u64> {
    let start = cursor.pos;
    let mut acc = BitAccumulator::new();
    let mut saw_digits = false;
    let mut integer_digits: i64 = 0;
    let mut leading_fraction_zeros: i64 = 0;

    while let Some(d) = cursor.digit(16) {
        cursor.pos += 1;
        saw_digits = true;
        if acc.is_empty() && d == 0 {
            continue;
        }
        acc.push(d, 4);
        integer_digits += 1;
    }
    if cursor.eat(b'.') {
        while let Some(d) = cursor.digit(16) {
            cursor.pos += 1;
            saw_digits = true;
            if acc.is_empty() && d == 0 {
                leading_fraction_zeros += 1;
                continue;
            }
            acc.push(d, 4);
        }
    }
    if !saw_digits {
        return Err(Error::malformed(cursor.text, start, LiteralError::MissingDigits));
    }
    if !cursor.eat_either(b'p', b'P') {
        return Err(cursor.error(LiteralError::MissingBinaryExponent));
    }
    let exponent = cursor.exponent()?;
    cursor.expect_end()?;

    // Binary exponent of the top bit of the first significant digit's nibble.
    let top = if integer_digits > 0 {
        4 * integer_digits - 1
    } else {
        -4 * leading_fraction_zeros - 1
    };
    Ok(acc.finish(layout, negative, top + i64::from(exponent)))
}

/// Integer digits in base 2, 8 or 16.
fn parse_radix_integer(
    cursor: &mut Cursor<'_>,
    layout: &Layout,
    negative: bool,
    radix: u32,
) -> Result<u64> {
    let bits_per_digit = radix.trailing_zeros();
    let mut acc = BitAccumulator::new();
    let mut saw_digits = false;
    let mut digits: i64 = 0;

    while let Some(b) = cursor.peek() {
        let d = match char::from(b).to_digit(radix) {
            Some(d) => d,
            None if b.is_ascii_digit() => {
                return Err(cursor.error(LiteralError::DigitOutOfRange {
                    digit: char::from(b),
                    radix,
                }));
            }
            None => break,
        };
        cursor.pos += 1;
        saw_digits = true;
        if acc.is_empty() && d == 0 {
            continue;
        }
        acc.push(d, bits_per_digit);
        digits += 1;
    }
    if !saw_digits {
        return Err(cursor.error(LiteralError::MissingDigits));
    }
    cursor.expect_end()?;

    Ok(acc.finish(layout, negative, i64::from(bits_per_digit) * digits - 1))
}

fn parse_decimal(cursor: &mut Cursor<'_>, layout: &Layout, negative: bool) -> Result<u64> {
    let start = cursor.pos;
    let mut decimal = Decimal::default();
    let mut point: i32 = 0;
    let mut integer: Option<u64> = Some(0);
    let mut integral = true;
    let mut saw_digits = false;

    while let Some(d) = cursor.digit(10) {
        cursor.pos += 1;
        saw_digits = true;
        integer = integer
            .and_then(|n| n.checked_mul(10))
            .and_then(|n| n.checked_add(u64::from(d)));
        if decimal.num_digits == 0 && d == 0 {
            continue;
        }
        decimal.push_digit(d as u8);
        point = point.saturating_add(1);
    }
    if cursor.eat(b'.') {
        integral = false;
        while let Some(d) = cursor.digit(10) {
            cursor.pos += 1;
            saw_digits = true;
            if decimal.num_digits == 0 && d == 0 {
                point = point.saturating_sub(1);
                continue;
            }
            decimal.push_digit(d as u8);
        }
    }
    if !saw_digits {
        return Err(Error::malformed(cursor.text, start, LiteralError::MissingDigits));
    }

    let mut exponent = 0;
    if cursor.eat_either(b'e', b'E') {
        integral = false;
        exponent = cursor.exponent()?;
    }
    cursor.expect_end()?;

    if let (true, Some(n)) = (integral, integer) {
        trace!("{:?}: decimal integer", cursor.text);
        return Ok(round_integer(layout, negative, n));
    }

    if decimal.truncated {
        trace!("{:?}: digits beyond {} dropped", cursor.text, decimal.num_digits);
    }
    decimal.decimal_point = point.saturating_add(exponent);
    Ok(decimal.to_bits(layout, negative))
}
