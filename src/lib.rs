//! Correctly rounded conversion between text and IEEE 754 values.
//!
//! This crate provides three traits:
//! - [`FromLiteral`] for parsing decimal, hexadecimal float and radix integer
//!   literals into `f64`, `f32` or [`Half`]
//! - [`ToDecimal`] for the shortest decimal text that parses back to the same
//!   value (`0.1`, `1.0E7`)
//! - [`ToHex`] for the exact hexadecimal form (`0x1.8p1`)
//!
//! All three are thin wrappers over functions on bit patterns held in a
//! `u64` and described by a [`Layout`]: [`parse_bits`],
//! [`format_decimal_bits`] and [`format_hex_bits`]. The same code serves
//! binary16, binary32 and binary64.
//!
//! # Examples
//!
//! ```
//! use fconv::{FromLiteral, ToDecimal, ToHex};
//!
//! // Parsing
//! assert_eq!(f64::parse_literal("0.1").unwrap(), 0.1);
//! assert_eq!(f64::parse_literal("0x1.8p1").unwrap(), 3.0);
//! assert_eq!(f32::parse_literal("0b101").unwrap(), 5.0);
//!
//! // Formatting
//! assert_eq!((0.1_f64 + 0.2).to_decimal(), "0.30000000000000004");
//! assert_eq!(1.0e7_f64.to_decimal(), "1.0E7");
//! assert_eq!(3.0_f64.to_hex(), "0x1.8p1");
//!
//! // Round-trip
//! let original = std::f64::consts::PI;
//! assert_eq!(f64::parse_literal(&original.to_decimal()).unwrap(), original);
//! assert_eq!(f64::parse_literal(&original.to_hex()).unwrap(), original);
//! ```
//!
//! # Decimal format
//!
//! Magnitudes in `[1e-3, 1e7)` print in plain notation with at least one
//! fractional digit (`100.0`, `0.001`); everything else prints as
//! `d.dddE<exp>` (`1.0E7`, `5.0E-324`). Special values are `NaN`,
//! `Infinity` and `-Infinity`.
//!
//! # Hex format
//!
//! `±0x1.hhhp±d` for normal values and `±0x0.hhhp<min>` for subnormals,
//! where the significand digits are the stored bits left-aligned to whole
//! nibbles with trailing zeros dropped, and `d` is the unbiased exponent in
//! decimal. Zero is `0x0.0p0`.
//!
//! # Errors
//!
//! Parsing fails only on text outside the literal grammar, with an
//! [`Error::MalformedLiteral`] that records where. Out-of-range values are
//! not errors: they saturate to infinity or flush to zero. Formatting never
//! fails.
//!
//! # Features
//!
//! - `half` (default): the [`Half`] binary16 type.

mod decimal;
pub mod error;
pub mod format;
#[cfg(feature = "half")]
mod half;
pub mod layout;
pub mod parse;
mod round;
pub mod scale;

pub use error::{Error, LiteralError, Result};
pub use format::{format_decimal_bits, format_hex_bits};
#[cfg(feature = "half")]
pub use half::Half;
pub use layout::{Category, Ieee754, Layout, BINARY16, BINARY32, BINARY64};
pub use parse::parse_bits;
pub use round::transcode;
pub use scale::{copy_sign, get_exponent, next_down, next_up, ulp, Scale};

/// Trait for parsing literals into floating-point values.
///
/// # Examples
///
/// ```
/// use fconv::FromLiteral;
///
/// assert_eq!(f64::parse_literal("1.5e3"), Ok(1500.0));
/// assert_eq!(f64::parse_literal("-0x1.4p3"), Ok(-10.0));
/// assert_eq!(f64::parse_literal("0x1f"), Ok(31.0));
/// assert_eq!(f64::parse_literal("017"), Ok(15.0));
/// assert_eq!(f64::parse_literal("-Infinity"), Ok(f64::NEG_INFINITY));
/// assert!(f64::parse_literal("nan").unwrap().is_nan());
/// assert_eq!(f32::parse_literal("1e39"), Ok(f32::INFINITY));
/// ```
///
/// # Accepted Formats
///
/// - Decimal: `1`, `1.5`, `.5`, `1.`, `1e10`, `-2.5E-3`
/// - Hex floats: `0x1.8p1`, `0X1P-10`, `0x.8p1`; the `p` exponent is required
/// - Radix integers: `0x1F` (base 16), `0b101` (base 2), `017` (base 8)
/// - Special values: `nan`, `inf`, `infinity` in any case, optionally signed
///
/// # Errors
///
/// Returns [`Error::MalformedLiteral`] for an empty string, a sign or point
/// with no digits, a missing or empty exponent, a digit outside the base,
/// or any character outside the grammar (including whitespace).
pub trait FromLiteral: Sized {
    fn parse_literal(text: &str) -> Result<Self>;
}

/// Trait for formatting floating-point values as the shortest decimal text
/// that parses back to the same value.
///
/// # Examples
///
/// ```
/// use fconv::ToDecimal;
///
/// assert_eq!(1.0_f32.to_decimal(), "1.0");
/// assert_eq!(0.1_f32.to_decimal(), "0.1");
/// assert_eq!(f32::MAX.to_decimal(), "3.4028235E38");
/// assert_eq!(1.0e-4_f64.to_decimal(), "1.0E-4");
/// assert_eq!((-0.0_f64).to_decimal(), "-0.0");
/// assert_eq!(f64::NAN.to_decimal(), "NaN");
/// ```
pub trait ToDecimal {
    #[must_use]
    fn to_decimal(self) -> String;
}

/// Trait for formatting floating-point values as exact hexadecimal text.
///
/// # Examples
///
/// ```
/// use fconv::ToHex;
///
/// assert_eq!(1.0_f32.to_hex(), "0x1.0p0");
/// assert_eq!((-3.5_f64).to_hex(), "-0x1.cp1");
/// assert_eq!(5e-324_f64.to_hex(), "0x0.0000000000001p-1022");
/// assert_eq!(f64::INFINITY.to_hex(), "Infinity");
/// ```
pub trait ToHex {
    #[must_use]
    fn to_hex(self) -> String;
}

impl<F: Ieee754> FromLiteral for F {
    fn parse_literal(text: &str) -> Result<Self> {
        parse::parse_literal(text)
    }
}

impl<F: Ieee754> ToDecimal for F {
    fn to_decimal(self) -> String {
        format::format_decimal(self)
    }
}

impl<F: Ieee754> ToHex for F {
    fn to_hex(self) -> String {
        format::format_hex(self)
    }
}
