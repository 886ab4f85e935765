//! Lenient numeric parsing and monetary formatting.
//!
//! Form fields arrive as raw text. Parsing follows "longest numeric
//! prefix" rules: leading whitespace is skipped, trailing garbage is
//! ignored, and text with no leading number yields `None`. Callers
//! decide whether `None` means "reject" or "treat as zero".

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

const HALF: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Decimal places shown for money.
const DECIMAL_PLACES: u32 = 2;

/// Parse the longest decimal number at the start of `text`.
///
/// `"12.5kg"` → `Some(12.5)`, `"  -3"` → `Some(-3)`, `"abc"` → `None`.
/// Numbers outside the `Decimal` range also yield `None`.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    let negative = end < bytes.len() && bytes[end] == b'-';
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let int_digits = &s[int_start..end];

    let mut frac_digits = "";
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if !int_digits.is_empty() || frac_end > frac_start {
            frac_digits = &s[frac_start..frac_end];
            end = frac_end;
        }
    }
    if int_digits.is_empty() && frac_digits.is_empty() {
        return None;
    }

    // Optional exponent, only consumed when complete.
    let mut exponent: Option<&str> = None;
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let exp_start = end + 1;
        let mut exp_end = exp_start;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            exponent = Some(&s[exp_start..exp_end]);
        }
    }

    let mantissa = format!(
        "{}{}.{}",
        if negative { "-" } else { "" },
        if int_digits.is_empty() { "0" } else { int_digits },
        if frac_digits.is_empty() { "0" } else { frac_digits },
    );
    let value = match exponent {
        None => Decimal::from_str(&mantissa).ok()?,
        Some(exp) => {
            let exp: i64 = exp.trim_start_matches('+').parse().ok()?;
            Decimal::from_scientific(&format!("{}e{}", mantissa, exp)).ok()?
        }
    };
    Some(if value.is_zero() { Decimal::ZERO } else { value })
}

/// Parse an amount, treating anything unparseable as zero.
pub fn amount_or_zero(text: &str) -> Decimal {
    parse_amount(text).unwrap_or(Decimal::ZERO)
}

/// Parse the leading integer of `text` (`"2.5"` → `Some(2)`).
pub fn parse_quantity(text: &str) -> Option<i64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    s[..end].parse::<i64>().ok()
}

/// Round half up to the nearest whole unit: `199.5` → `200`, `-50.5` → `-50`.
pub fn round_half_up(value: Decimal) -> Decimal {
    value.saturating_add(HALF).floor()
}

/// Two-decimal fixed formatting, halves away from zero: `200` → `"200.00"`.
pub fn format_fixed(value: Decimal) -> String {
    let mut rounded =
        value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        rounded = Decimal::ZERO;
    }
    rounded.rescale(DECIMAL_PLACES);
    rounded.to_string()
}

/// Signed two-decimal formatting with an explicit `+` for non-negative
/// values, as used for the round-off adjustment.
pub fn format_signed(value: Decimal) -> String {
    let fixed = format_fixed(value);
    if fixed.starts_with('-') {
        fixed
    } else {
        format!("+{}", fixed)
    }
}

/// Shortest natural formatting of a unit price: `50.00` → `"50"`,
/// `12.50` → `"12.5"`.
pub fn format_plain(value: Decimal) -> String {
    if value.is_zero() {
        return "0".to_string();
    }
    value.normalize().to_string()
}

/// Prefix an amount with a currency label: `("Rs.", 200)` → `"Rs.200.00"`.
pub fn with_currency(currency: &str, value: Decimal) -> String {
    let fixed = format_fixed(value);
    match fixed.strip_prefix('-') {
        Some(abs) => format!("-{}{}", currency, abs),
        None => format!("{}{}", currency, fixed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(text: &str) -> Decimal {
        Decimal::from_str(text).unwrap()
    }

    #[test]
    fn parses_plain_numbers() {
        assert_eq!(parse_amount("50"), Some(d("50")));
        assert_eq!(parse_amount("199.50"), Some(d("199.5")));
        assert_eq!(parse_amount(".5"), Some(d("0.5")));
        assert_eq!(parse_amount("7."), Some(d("7")));
        assert_eq!(parse_amount("-3"), Some(d("-3")));
        assert_eq!(parse_amount("+4.10"), Some(d("4.1")));
    }

    #[test]
    fn parses_numeric_prefix() {
        assert_eq!(parse_amount("  12.5kg"), Some(d("12.5")));
        assert_eq!(parse_amount("1e2x"), Some(d("100")));
        assert_eq!(parse_amount("2.5E-1"), Some(d("0.25")));
        assert_eq!(parse_amount("3e"), Some(d("3")));
        assert_eq!(parse_amount("4.2.1"), Some(d("4.2")));
    }

    #[test]
    fn rejects_non_numeric() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("-"), None);
        assert_eq!(parse_amount("."), None);
        assert_eq!(parse_amount("1e400"), None);
        assert_eq!(amount_or_zero("n/a"), Decimal::ZERO);
    }

    #[test]
    fn negative_zero_is_zero() {
        assert_eq!(format_fixed(parse_amount("-0.00").unwrap()), "0.00");
    }

    #[test]
    fn quantity_takes_integer_prefix() {
        assert_eq!(parse_quantity("4"), Some(4));
        assert_eq!(parse_quantity("2.9"), Some(2));
        assert_eq!(parse_quantity(" 10 boxes"), Some(10));
        assert_eq!(parse_quantity("-1"), Some(-1));
        assert_eq!(parse_quantity("x2"), None);
        assert_eq!(parse_quantity(""), None);
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(round_half_up(d("199.5")), d("200"));
        assert_eq!(round_half_up(d("199.49")), d("199"));
        assert_eq!(round_half_up(d("210")), d("210"));
        assert_eq!(round_half_up(d("-50.5")), d("-50"));
        assert_eq!(round_half_up(d("-50.6")), d("-51"));
        // 15 x 4.10 is exactly 61.5.
        assert_eq!(round_half_up(d("4.10") * Decimal::from(15)), d("62"));
    }

    #[test]
    fn formats_amounts() {
        assert_eq!(format_fixed(d("200")), "200.00");
        assert_eq!(format_fixed(d("-0.001")), "0.00");
        assert_eq!(format_fixed(d("0.125")), "0.13");
        assert_eq!(format_signed(d("0.5")), "+0.50");
        assert_eq!(format_signed(Decimal::ZERO), "+0.00");
        assert_eq!(format_signed(d("-0.25")), "-0.25");
        assert_eq!(format_plain(d("50.00")), "50");
        assert_eq!(format_plain(d("12.50")), "12.5");
        assert_eq!(with_currency("Rs.", d("210")), "Rs.210.00");
        assert_eq!(with_currency("Rs.", d("-50")), "-Rs.50.00");
    }
}
