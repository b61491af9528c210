//! Lenient field access on loosely structured JSON.
//!
//! Source logs are not schema-checked: a field can be absent, `null`, or carry
//! an unexpected type. These helpers collapse all of that into neutral
//! defaults so typed records can be built once at the load boundary.

use serde_json::Value;

/// String value of `key`, or `""` when absent or not a string.
pub fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// String value of `key`, or `None` when absent or not a string.
pub fn opt_str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Numeric value of `key` as `f64`, or `0.0`.
pub fn f64_field(value: &Value, key: &str) -> f64 {
    value.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

/// Integer value of `key`.
///
/// Integral floats (`6.0`) are accepted; fractional values and non-numbers
/// yield `None`.
pub fn i64_field(value: &Value, key: &str) -> Option<i64> {
    let raw = value.get(key)?;
    if let Some(n) = raw.as_i64() {
        return Some(n);
    }
    let f = raw.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Non-negative counter value of `key`, or `0`.
pub fn u64_field(value: &Value, key: &str) -> u64 {
    match value.get(key) {
        Some(v) => v
            .as_u64()
            .or_else(|| v.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        None => 0,
    }
}

/// Last path segment of a URL, or `"inline"` for an empty URL.
pub fn url_basename(url: &str) -> &str {
    if url.is_empty() {
        return "inline";
    }
    url.rsplit('/').next().unwrap_or(url)
}
