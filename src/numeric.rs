//! Small numeric helpers shared by the codec, the validator and the map helpers.

/// Rounds `value` to `decimals` places, ties rounding towards positive infinity.
///
/// # Examples
///
/// ```
/// use ev_dss::numeric::round_to;
///
/// assert_eq!(round_to(0.081234, 4), 0.0812);
/// assert_eq!(round_to(2.345, 1), 2.3);
/// assert_eq!(round_to(-0.5, 0), 0.0);
/// ```
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let pow = 10_f64.powi(decimals);
    (value * pow + 0.5).floor() / pow
}

/// Parses a user-entered number, ignoring surrounding whitespace.
///
/// Returns `None` for empty input and for anything that is not a finite number.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_up() {
        assert_eq!(round_to(0.5, 0), 1.0);
        assert_eq!(round_to(1.5, 0), 2.0);
        assert_eq!(round_to(-1.5, 0), -1.0);
    }

    #[test]
    fn parse_number_trims_and_rejects_non_finite() {
        assert_eq!(parse_number(" 8.12 "), Some(8.12));
        assert_eq!(parse_number("10"), Some(10.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("   "), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
    }
}
