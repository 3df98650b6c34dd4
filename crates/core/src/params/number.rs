//! Scalar conversions for parameter values
//!
//! Integers are strict base-10 with an optional magnitude suffix:
//! `k` (x1,000), `m` (x1,000,000), `g` (x1,000,000,000), case-insensitive.
//! `"100m"` is `100_000_000`. Anything else that is not a plain integer is
//! rejected so that typed getters fall back to their default.

/// Parse a signed integer with an optional magnitude suffix
pub fn parse_i64(text: &str) -> Option<i64> {
    let text = text.trim();
    let (digits, multiplier) = split_suffix(text);
    if digits.is_empty() {
        return None;
    }
    let base: i64 = digits.parse().ok()?;
    base.checked_mul(multiplier)
}

/// Parse an unsigned integer with an optional magnitude suffix
pub fn parse_u64(text: &str) -> Option<u64> {
    let text = text.trim();
    let (digits, multiplier) = split_suffix(text);
    if digits.is_empty() || digits.starts_with('-') {
        return None;
    }
    let base: u64 = digits.parse().ok()?;
    base.checked_mul(multiplier as u64)
}

/// Parse a 32-bit integer; out-of-range values are rejected
pub fn parse_i32(text: &str) -> Option<i32> {
    parse_i64(text).and_then(|v| i32::try_from(v).ok())
}

/// Parse a finite base-10 floating point value
///
/// `inf`, `NaN` and values that overflow to infinity are rejected.
pub fn parse_f64(text: &str) -> Option<f64> {
    let text = text.trim();
    let decimal = |c: char| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E');
    if text.is_empty() || !text.chars().all(decimal) {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a boolean: `true/false`, `yes/no`, `on/off`, `1/0`
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn split_suffix(text: &str) -> (&str, i64) {
    match text.chars().last() {
        Some('k') | Some('K') => (&text[..text.len() - 1], 1_000),
        Some('m') | Some('M') => (&text[..text.len() - 1], 1_000_000),
        Some('g') | Some('G') => (&text[..text.len() - 1], 1_000_000_000),
        _ => (text, 1),
    }
}
