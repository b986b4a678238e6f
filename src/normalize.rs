use serde_json::Value;

use crate::types::Coordinate;

/// Coerce a stored coordinate component to `f64`.
///
/// - null or empty string: `None`
/// - JSON number: the number as `f64`
/// - numeric string: the parsed number
/// - anything else: `None`, without reporting an error
pub fn normalize(value: &Value) -> Option<f64> {
    match *value {
        Value::Number(ref n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(ref s) if is_numeric(s) => {
            s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}

/// Like [`normalize`] for an optional lookup result.
pub fn normalize_opt(value: Option<&Value>) -> Option<f64> {
    value.and_then(normalize)
}

/// Whether `s` is a plain decimal literal: optional surrounding whitespace, an
/// optional sign, digits with an optional fraction, and an optional exponent.
/// Rejects the `inf`/`nan` spellings and hex that `f64::from_str` would accept.
pub fn is_numeric(s: &str) -> bool {
    let b = s.trim().as_bytes();
    let mut i = 0;
    if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
        i += 1;
    }
    let int_start = i;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < b.len() && b[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        digits += i - frac_start;
    }
    if digits == 0 {
        return false;
    }
    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        i += 1;
        if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }
    i == b.len()
}

/// Round to 6 decimal digits, the precision the map overlay reports corners in.
pub fn round6(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}

/// Parse coordinates pasted as `"lat, lng"`, `"lat lng"` or `"lat;lng"`.
/// Out-of-range latitudes and longitudes are rejected.
pub fn parse_pasted(input: &str) -> Option<Coordinate> {
    let parts: Vec<&str> = input
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 2 {
        return None;
    }
    let lat = normalize(&Value::String(parts[0].to_owned()))?;
    let lng = normalize(&Value::String(parts[1].to_owned()))?;
    if lat.abs() > 90.0 || lng.abs() > 180.0 {
        return None;
    }
    Some(Coordinate::new(lat, lng))
}
