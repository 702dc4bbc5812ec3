#![no_main]

use libfuzzer_sys::fuzz_target;

use fconv::{FromLiteral, Half, ToDecimal};

fuzz_target!(|data: &[u8]| {
    // Convert arbitrary bytes to a string (invalid UTF-8 becomes replacement chars)
    let source = String::from_utf8_lossy(data);

    // Parsing must never panic, whatever the width
    let wide = f64::parse_literal(&source);
    let _ = f32::parse_literal(&source);
    let _ = Half::parse_literal(&source);

    // Anything accepted prints back to text that names the same value
    if let Ok(value) = wide {
        let text = value.to_decimal();
        let reparsed = f64::parse_literal(&text).expect("formatter output must parse");
        assert!(
            reparsed.to_bits() == value.to_bits() || value.is_nan() && reparsed.is_nan(),
            "{:?} -> {} -> {}",
            source,
            text,
            reparsed
        );
    }
});
