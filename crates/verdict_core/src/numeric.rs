//! Lenient readers for loosely typed JSON values.

use serde_json::Value;

/// Reads a number or a numeric string. Anything else, including strings that
/// do not parse and non-finite values, is treated as absent.
pub fn number_like(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Converts a score to a percentage in [0, 100]. Values up to 1 are read as
/// fractions, larger values as percentages already.
pub fn to_percent(value: f64) -> f64 {
    if value <= 1.0 {
        value.clamp(0.0, 1.0) * 100.0
    } else {
        value.min(100.0)
    }
}

/// Converts a negative-class score to a positive-class fraction.
pub fn invert_fraction(value: f64) -> f64 {
    let p = if value <= 1.0 {
        1.0 - value
    } else {
        (100.0 - value.min(100.0)) / 100.0
    };
    p.clamp(0.0, 1.0)
}

/// Final rounding of a percentage for display.
pub fn round_percent(pct: f64) -> u8 {
    pct.clamp(0.0, 100.0).round() as u8
}

/// Non-empty string value, if any.
pub fn text(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

/// First field in `keys` for which `read` yields a value.
pub fn first_of<'a, T>(
    payload: &'a Value,
    keys: &[String],
    read: impl Fn(&'a Value) -> Option<T>,
) -> Option<T> {
    keys.iter()
        .filter_map(|k| payload.get(k.as_str()))
        .find_map(read)
}
