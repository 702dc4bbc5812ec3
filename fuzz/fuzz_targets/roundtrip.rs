#![no_main]

use libfuzzer_sys::fuzz_target;

use fconv::{FromLiteral, Half, ToDecimal, ToHex};

fuzz_target!(|data: (f64, f32, u16)| {
    let (f64_val, f32_val, half_bits) = data;

    // f64 round-trip through both text forms
    for text in [f64_val.to_decimal(), f64_val.to_hex()] {
        let parsed = f64::parse_literal(&text);
        assert!(parsed.is_ok(), "Failed to parse f64 output: {}", text);
        let parsed = parsed.unwrap();
        if f64_val.is_nan() {
            assert!(parsed.is_nan());
        } else {
            assert_eq!(
                f64_val.to_bits(),
                parsed.to_bits(),
                "f64 roundtrip mismatch: {} -> {}",
                f64_val,
                text
            );
        }
    }

    // f32 round-trip
    for text in [f32_val.to_decimal(), f32_val.to_hex()] {
        let parsed = f32::parse_literal(&text);
        assert!(parsed.is_ok(), "Failed to parse f32 output: {}", text);
        let parsed = parsed.unwrap();
        if f32_val.is_nan() {
            assert!(parsed.is_nan());
        } else {
            assert_eq!(
                f32_val.to_bits(),
                parsed.to_bits(),
                "f32 roundtrip mismatch: {} -> {}",
                f32_val,
                text
            );
        }
    }

    // binary16 round-trip, and narrowing from f32 agrees with the text path
    let half = Half::from_bits(half_bits);
    if !half.is_nan() {
        assert_eq!(Half::parse_literal(&half.to_decimal()), Ok(half));
        assert_eq!(Half::parse_literal(&half.to_hex()), Ok(half));
        assert_eq!(Half::from_f32(half.to_f32()), half);
    }
    if !f32_val.is_nan() {
        assert_eq!(Half::from_f32(f32_val), Half::from_f64(f64::from(f32_val)));
    }
});
