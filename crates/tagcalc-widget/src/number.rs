//! String to number conversion for pending input.
//!
//! The rules follow browser `Number(text)` conversion: surrounding whitespace
//! is ignored, an empty string is zero, radix prefixes and `Infinity` are
//! understood, and anything else that is not a plain decimal is NaN.

use tagcalc_expr::number_value;

/// Converts `text` to a number, yielding NaN when it is not numeric.
pub fn to_number(text: &str) -> f64 {
    let trimmed = text.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    if has_radix_prefix(trimmed) {
        return number_value(trimmed).unwrap_or(f64::NAN);
    }

    if is_decimal(trimmed) {
        trimmed.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// True when committing `text` as a literal is allowed.
///
/// Note that the empty string counts as valid because it converts to zero.
pub fn is_valid_number(text: &str) -> bool {
    !to_number(text).is_nan()
}

fn has_radix_prefix(text: &str) -> bool {
    matches!(
        text.get(..2),
        Some("0x" | "0X" | "0o" | "0O" | "0b" | "0B")
    )
}

// [+-]? (digits [. digits?] | . digits) ([eE] [+-]? digits)?
fn is_decimal(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    let mut mantissa_digits = i - int_start;

    if bytes.get(i) == Some(&b'.') {
        i += 1;
        let frac_start = i;
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        mantissa_digits += i - frac_start;
    }

    if mantissa_digits == 0 {
        return false;
    }

    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exp_start = i;
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_forms() {
        assert_eq!(to_number("3.14"), 3.14);
        assert_eq!(to_number("-5"), -5.0);
        assert_eq!(to_number("+5"), 5.0);
        assert_eq!(to_number(".5"), 0.5);
        assert_eq!(to_number("5."), 5.0);
        assert_eq!(to_number("1e3"), 1000.0);
        assert_eq!(to_number("2.5E-2"), 0.025);
        assert_eq!(to_number("  42\t"), 42.0);
    }

    #[test]
    fn test_empty_string_is_zero() {
        assert_eq!(to_number(""), 0.0);
        assert_eq!(to_number("   "), 0.0);
        assert!(is_valid_number(""));
    }

    #[test]
    fn test_radix_and_infinity() {
        assert_eq!(to_number("0x1F"), 31.0);
        assert_eq!(to_number("0b11"), 3.0);
        assert_eq!(to_number("0o10"), 8.0);
        assert_eq!(to_number("Infinity"), f64::INFINITY);
        assert_eq!(to_number("-Infinity"), f64::NEG_INFINITY);
        assert!(to_number("0x").is_nan());
        assert!(to_number("0xZZ").is_nan());
        assert!(to_number("-0x10").is_nan());
    }

    #[test]
    fn test_rejects_non_numbers() {
        for text in [
            "abc", "12abc", ".", "-", "1e", "1e+", "nan", "NaN", "inf", "infinity", "1_000", "1 2",
            "--1",
        ] {
            assert!(!is_valid_number(text), "{text:?} should not be numeric");
        }
    }
}
