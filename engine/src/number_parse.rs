//! FILENAME: engine/src/number_parse.rs
//! PURPOSE: Heuristic numeric parsing for loosely-typed cell strings.
//! CONTEXT: Cell values arrive as display text ("$1,234", "1.5万", "20%").
//! This module extracts the number a human would read out of them. Parsing
//! failures are never fatal: callers receive `None` and degrade.

use once_cell::sync::Lazy;
use regex::Regex;

/// A complete numeric literal: optional sign, digits, optional fraction,
/// optional exponent.
static STRICT_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$").unwrap());

/// Fallback: the first number-like substring anywhere in the text.
static LENIENT_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[+-]?\d+(?:\.\d+)?").unwrap());

/// Characters removed before matching: thousands separators, currency
/// symbols, and accounting parentheses (stripped, not negated).
fn is_noise_char(c: char) -> bool {
    matches!(
        c,
        ',' | '，' | '(' | ')' | '（' | '）' | '$' | '＄' | '¥' | '￥' | '€' | '£' | '₩'
    )
}

/// Multiplier for a trailing unit suffix, if the character is one.
fn unit_multiplier(c: char) -> Option<f64> {
    match c {
        'k' | 'K' => Some(1e3),
        'm' | 'M' => Some(1e6),
        'b' | 'B' => Some(1e9),
        'w' | 'W' | '万' => Some(1e4),
        '亿' => Some(1e8),
        _ => None,
    }
}

/// Parse a cell string into a number.
///
/// Strips thousands separators, currency symbols, and parentheses, honors a
/// trailing percent sign (divided by 100 after conversion) and a trailing
/// unit suffix (`k`/`m`/`b`/`w`/`万`/`亿`). A strict literal match is tried
/// first; otherwise the first number-like substring is used. Returns `None`
/// when the input contains no digit at all.
pub fn parse_number(raw: &str) -> Option<f64> {
    parse_number_impl(raw, true)
}

/// Like `parse_number` but without the first-number-like-substring
/// fallback: the cleaned string must be a complete numeric literal.
///
/// The sort comparator uses this one. Under the lenient fallback a date
/// string such as "2023-12-31" would read as 2023 and every date column
/// would sort by its leading digits instead of reaching the date
/// comparison.
pub fn parse_number_strict(raw: &str) -> Option<f64> {
    parse_number_impl(raw, false)
}

fn parse_number_impl(raw: &str, lenient: bool) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let mut cleaned: String = trimmed.chars().filter(|c| !is_noise_char(*c)).collect();
    cleaned = cleaned.trim().to_string();

    let mut percent = false;
    if let Some(rest) = cleaned
        .strip_suffix('%')
        .or_else(|| cleaned.strip_suffix('％'))
    {
        percent = true;
        cleaned = rest.trim_end().to_string();
    }

    let mut multiplier = 1.0;
    if let Some(last) = cleaned.chars().last() {
        if let Some(m) = unit_multiplier(last) {
            let rest = cleaned[..cleaned.len() - last.len_utf8()].trim_end();
            // Only a unit when it directly follows the number ("1.5万"),
            // not when it ends an arbitrary word ("10 km")
            if rest.chars().last().is_some_and(|c| c.is_ascii_digit() || c == '.') {
                multiplier = m;
                cleaned = rest.to_string();
            }
        }
    }

    let value = if STRICT_NUMBER_RE.is_match(&cleaned) {
        cleaned.parse::<f64>().ok()?
    } else if lenient {
        LENIENT_NUMBER_RE
            .find(&cleaned)
            .and_then(|m| m.as_str().parse::<f64>().ok())?
    } else {
        return None;
    };

    let mut value = value * multiplier;
    if percent {
        value /= 100.0;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_numbers() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number("  -3.5 "), Some(-3.5));
        assert_eq!(parse_number("+0.25"), Some(0.25));
        assert_eq!(parse_number("1e3"), Some(1000.0));
    }

    #[test]
    fn test_currency_and_separators() {
        assert_eq!(parse_number("$1,234"), Some(1234.0));
        assert_eq!(parse_number("¥12,345.67"), Some(12345.67));
        assert_eq!(parse_number("(1,000)"), Some(1000.0));
    }

    #[test]
    fn test_percent() {
        assert_eq!(parse_number("20%"), Some(0.2));
        assert_eq!(parse_number("12.5 %"), Some(0.125));
    }

    #[test]
    fn test_unit_suffixes() {
        assert_eq!(parse_number("1.5万"), Some(15000.0));
        assert_eq!(parse_number("2亿"), Some(200_000_000.0));
        assert_eq!(parse_number("3k"), Some(3000.0));
        assert_eq!(parse_number("1.2M"), Some(1_200_000.0));
        assert_eq!(parse_number("0.5b"), Some(500_000_000.0));
        assert_eq!(parse_number("7w"), Some(70_000.0));
    }

    #[test]
    fn test_suffix_requires_adjacent_digit() {
        // 'm' here ends a unit word, not a multiplier
        assert_eq!(parse_number("10 km"), Some(10.0));
    }

    #[test]
    fn test_lenient_fallback() {
        assert_eq!(parse_number("约120元/月"), Some(120.0));
        assert_eq!(parse_number("abc 7.5 def"), Some(7.5));
    }

    #[test]
    fn test_strict_rejects_embedded_numbers() {
        assert_eq!(parse_number_strict("2023-12-31"), None);
        assert_eq!(parse_number_strict("约120元/月"), None);
        assert_eq!(parse_number_strict("$1,234"), Some(1234.0));
        assert_eq!(parse_number_strict("1.5万"), Some(15000.0));
    }

    #[test]
    fn test_no_digit_is_none() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("   "), None);
        assert_eq!(parse_number("n/a"), None);
        assert_eq!(parse_number("$$"), None);
    }
}
