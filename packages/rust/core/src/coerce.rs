//! Numeric-if-possible coercion of cell text.

use std::sync::LazyLock;

use regex::Regex;

use tablesift_shared::Value;

/// Digits an `f64` carries without rounding; longer numbers stay text.
const MAX_SIGNIFICANT_DIGITS: usize = 15;

/// Currency signs stripped before parsing.
pub const CURRENCY_SIGNS: [char; 4] = ['$', '€', '£', '¥'];

/// Plain digits, or digits grouped by thousands separators, with an optional
/// fractional part; or a bare fraction like `.5`.
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?|\.\d+)$").expect("valid regex")
});

/// Coerce cell text to [`Value::Numeric`] when it reads as a number,
/// otherwise keep it as [`Value::Text`].
///
/// Accepts currency signs, a leading `+`/`-`, accounting parentheses
/// (`(1,234)` is `-1234`), and well-formed thousands separators. Percentages,
/// ranges, and anything `f64::from_str` would accept but a report would not
/// print (`inf`, `NaN`, `1e5`) stay text. So do numbers with more significant
/// digits than an `f64` holds exactly, such as long account identifiers.
/// Negative zero (`(0)`, `-0`) comes out as `0`.
pub fn coerce(raw: &str) -> Value {
    let trimmed = raw.trim();
    parse_number(trimmed)
        .map(Value::Numeric)
        .unwrap_or_else(|| Value::Text(trimmed.to_string()))
}

fn parse_number(text: &str) -> Option<f64> {
    let stripped: String = text.chars().filter(|c| !CURRENCY_SIGNS.contains(c)).collect();
    let mut body = stripped.trim();
    let mut negative = false;

    if let Some(inner) = body.strip_prefix('(').and_then(|b| b.strip_suffix(')')) {
        negative = true;
        body = inner.trim();
    }

    if let Some(rest) = body.strip_prefix('-') {
        negative = !negative;
        body = rest.trim_start();
    } else if let Some(rest) = body.strip_prefix('+') {
        body = rest.trim_start();
    }

    if !NUMBER_RE.is_match(body) {
        return None;
    }

    if significant_digits(body) > MAX_SIGNIFICANT_DIGITS {
        return None;
    }

    let value: f64 = body.replace(',', "").parse().ok()?;
    Some(if negative && value != 0.0 { -value } else { value })
}

fn significant_digits(number: &str) -> usize {
    number
        .chars()
        .filter(char::is_ascii_digit)
        .skip_while(|&c| c == '0')
        .count()
}
