// Fixed-decimal truncation used by every averaged or derived statistic

/// Truncate `value` toward zero to at most `places` decimal digits.
///
/// Works on the decimal string form of the number, so digits past `places`
/// are dropped and never rounded: `truncate(Some(1.999), 2)` is `"1.99"` and
/// `truncate(Some(-3.456), 2)` is `"-3.45"`. Short fractions are zero padded
/// (`7.1` becomes `"7.10"`). Absent and non-finite inputs yield `None`.
pub fn truncate(value: Option<f64>, places: usize) -> Option<String> {
    let value = value.filter(|v| v.is_finite())?;

    // f64 Display never uses exponent notation
    let formatted = value.to_string();
    let (negative, magnitude) = match formatted.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, formatted.as_str()),
    };
    let (integer, fraction) = magnitude.split_once('.').unwrap_or((magnitude, ""));

    let mut digits = String::with_capacity(integer.len() + places + 2);
    digits.push_str(integer);
    if places > 0 {
        digits.push('.');
        digits.extend(fraction.chars().take(places));
        let kept = fraction.len().min(places);
        digits.extend(std::iter::repeat_n('0', places - kept));
    }

    let is_zero = digits.chars().all(|c| c == '0' || c == '.');
    if negative && !is_zero {
        digits.insert(0, '-');
    }
    Some(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_digits_instead_of_rounding() {
        assert_eq!(truncate(Some(1.999), 2).as_deref(), Some("1.99"));
        assert_eq!(truncate(Some(967.6), 2).as_deref(), Some("967.60"));
        assert_eq!(truncate(Some(21.9), 0).as_deref(), Some("21"));
    }

    #[test]
    fn test_negative_values_truncate_toward_zero() {
        assert_eq!(truncate(Some(-3.456), 2).as_deref(), Some("-3.45"));
        assert_eq!(truncate(Some(-12.7), 0).as_deref(), Some("-12"));
    }

    #[test]
    fn test_pads_short_fractions() {
        assert_eq!(truncate(Some(7.1), 2).as_deref(), Some("7.10"));
        assert_eq!(truncate(Some(42.0), 2).as_deref(), Some("42.00"));
        assert_eq!(truncate(Some(0.0), 2).as_deref(), Some("0.00"));
    }

    #[test]
    fn test_negative_zero_results_are_unsigned() {
        assert_eq!(truncate(Some(-0.4), 0).as_deref(), Some("0"));
        assert_eq!(truncate(Some(-0.004), 2).as_deref(), Some("0.00"));
        assert_eq!(truncate(Some(-0.0), 1).as_deref(), Some("0.0"));
    }

    #[test]
    fn test_small_and_large_magnitudes() {
        assert_eq!(truncate(Some(0.0000001), 2).as_deref(), Some("0.00"));
        assert_eq!(truncate(Some(1e21), 1).as_deref(), Some("1000000000000000000000.0"));
    }

    #[test]
    fn test_missing_and_non_finite_values() {
        assert_eq!(truncate(None, 2), None);
        assert_eq!(truncate(Some(f64::NAN), 2), None);
        assert_eq!(truncate(Some(f64::INFINITY), 2), None);
        assert_eq!(truncate(Some(f64::NEG_INFINITY), 0), None);
    }
}
