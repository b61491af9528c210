/// Format an integer count with thousands separators.
///
/// # Examples
///
/// ```
/// use tracelens_core::formatting::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(1234), "1,234");
/// assert_eq!(format_count(1234567), "1,234,567");
/// ```
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Convert a duration in trace microseconds to milliseconds.
pub fn micros_to_ms(micros: f64) -> f64 {
    micros / crate::thresholds::MICROS_PER_MS
}

/// Convert a byte count to megabytes.
pub fn bytes_to_mb(bytes: f64) -> f64 {
    bytes / crate::thresholds::BYTES_PER_MB
}

/// Calculate `(part / whole) * 100`.
///
/// Returns `0.0` if `whole` is zero to avoid division by zero.
///
/// # Examples
///
/// ```
/// use tracelens_core::formatting::percentage;
///
/// assert!((percentage(50.0, 200.0) - 25.0).abs() < 1e-9);
/// assert_eq!(percentage(3.0, 0.0), 0.0);
/// ```
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    (part / whole) * 100.0
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── format_count ─────────────────────────────────────────────────────────

    #[test]
    fn test_format_count_small() {
        assert_eq!(format_count(7), "7");
        assert_eq!(format_count(999), "999");
    }

    #[test]
    fn test_format_count_grouped() {
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(65535), "65,535");
        assert_eq!(format_count(10_000_000), "10,000,000");
    }

    // ── conversions ──────────────────────────────────────────────────────────

    #[test]
    fn test_micros_to_ms() {
        assert_eq!(micros_to_ms(60_000.0), 60.0);
        assert_eq!(micros_to_ms(0.0), 0.0);
    }

    #[test]
    fn test_bytes_to_mb() {
        assert_eq!(bytes_to_mb(51.0 * 1024.0 * 1024.0), 51.0);
    }

    // ── percentage ───────────────────────────────────────────────────────────

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(1.0, 4.0), 25.0);
        assert_eq!(percentage(0.0, 0.0), 0.0);
    }

    // ── group_thousands ──────────────────────────────────────────────────────

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("123456"), "123,456");
    }
}
