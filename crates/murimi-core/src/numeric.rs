//! Permissive numeric coercion shared by every aggregation.
//!
//! The registry's numeric fields (notably farm size) arrive as free text and
//! are treated fail-open: absent or malformed values contribute zero rather
//! than failing the pass. That policy lives here, in one definition point, so
//! it is visible and unit-testable instead of repeated ad hoc at call sites.

/// Parse a decimal field permissively, coercing anything invalid to 0.0.
///
/// `None`, empty strings, and non-numeric text all yield 0.0. Surrounding
/// whitespace is tolerated. Note this means bad data silently skews any
/// metric built on top of it.
pub fn parse_decimal_or_zero(value: Option<&str>) -> f64 {
    value
        .map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Round to one decimal place (half away from zero).
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Integer percentage share of `count` in `total`, 0 when `total` is 0.
pub fn percent_share(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (count as f64 / total as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_valid() {
        assert_eq!(parse_decimal_or_zero(Some("2.5")), 2.5);
        assert_eq!(parse_decimal_or_zero(Some("0")), 0.0);
        assert_eq!(parse_decimal_or_zero(Some(" 10.25 ")), 10.25);
    }

    #[test]
    fn test_parse_decimal_malformed_is_zero() {
        assert_eq!(parse_decimal_or_zero(Some("abc")), 0.0);
        assert_eq!(parse_decimal_or_zero(Some("")), 0.0);
        assert_eq!(parse_decimal_or_zero(Some("2,5")), 0.0);
        assert_eq!(parse_decimal_or_zero(None), 0.0);
    }

    #[test]
    fn test_parse_decimal_non_finite_is_zero() {
        assert_eq!(parse_decimal_or_zero(Some("NaN")), 0.0);
        assert_eq!(parse_decimal_or_zero(Some("inf")), 0.0);
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(12.34), 12.3);
        assert_eq!(round1(12.35), 12.4);
        assert_eq!(round1(0.0), 0.0);
    }

    #[test]
    fn test_percent_share() {
        assert_eq!(percent_share(1, 4), 25);
        assert_eq!(percent_share(2, 3), 67);
        assert_eq!(percent_share(0, 10), 0);
    }

    #[test]
    fn test_percent_share_zero_total() {
        assert_eq!(percent_share(5, 0), 0);
    }
}
