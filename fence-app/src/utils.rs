use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid number '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Trims whitespace and strips the characters people type around amounts:
/// thousands separators, a leading `$`, and a trailing `ft` or `'`.
fn normalize_decimal_input(s: &str) -> String {
    let trimmed = s.trim();
    let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed);
    let trimmed = trimmed
        .strip_suffix("ft")
        .or_else(|| trimmed.strip_suffix('\''))
        .unwrap_or(trimmed);
    trimmed.trim().replace(',', "")
}

/// Parses a money or measurement amount such as `"1,234.56"` or `"$400"`.
///
/// Empty or whitespace-only input is treated as 0.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| ParseDecimalError {
        input: s.to_string(),
        source: e,
    })
}

/// Parses an amount that may be left blank.
///
/// Returns `None` for blank input, and also when parsing fails: a value that
/// is not a number counts as not entered. Parse failures are logged.
pub fn parse_optional_decimal(s: &str) -> Option<Decimal> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        None
    } else {
        normalized.parse().map_or_else(
            |e| {
                tracing::warn!(input = %s, "treating unreadable number as not entered: {}", e);
                None
            },
            Some,
        )
    }
}

/// Formats an optional [`Decimal`] for display, using "—" when `None`.
pub fn opt_decimal_display(d: &Option<Decimal>) -> String {
    d.as_ref()
        .map(|v| v.normalize().to_string())
        .unwrap_or_else(|| "—".to_string())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn parse_decimal_accepts_comma_thousands_separator() {
        assert_eq!(parse_decimal("1,234.56").unwrap(), dec!(1234.56));
        assert_eq!(parse_decimal("1,234,567.89").unwrap(), dec!(1234567.89));
    }

    #[test]
    fn parse_decimal_strips_currency_and_units() {
        assert_eq!(parse_decimal("$400").unwrap(), dec!(400));
        assert_eq!(parse_decimal(" 120ft ").unwrap(), dec!(120));
        assert_eq!(parse_decimal("8'").unwrap(), dec!(8));
    }

    #[test]
    fn parse_decimal_empty_treated_as_zero() {
        assert_eq!(parse_decimal("").unwrap(), Decimal::ZERO);
        assert_eq!(parse_decimal("   ").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn parse_decimal_invalid_returns_error() {
        let err = parse_decimal("abc").unwrap_err();

        assert!(err.to_string().starts_with("invalid number 'abc'"));
    }

    #[test]
    fn parse_optional_decimal_blank_and_garbage_are_not_entered() {
        assert_eq!(parse_optional_decimal("1,234.56"), Some(dec!(1234.56)));
        assert_eq!(parse_optional_decimal(""), None);
        assert_eq!(parse_optional_decimal("   "), None);
        assert_eq!(parse_optional_decimal("twelve"), None);
    }

    #[test]
    fn opt_decimal_display_marks_missing_values() {
        assert_eq!(opt_decimal_display(&Some(dec!(120.50))), "120.5");
        assert_eq!(opt_decimal_display(&None), "—");
    }
}
