//! FILENAME: view-engine/src/filter.rs
//! PURPOSE: Row filtering - AND-combined evaluation of the filter rule list.
//! CONTEXT: Pure read of the rows; output is always a subset of the input.
//! A malformed rule never aborts the pass: unparsable numbers fail only the
//! row under that rule, an invalid regex pattern degrades to non-match.

use regex::{Regex, RegexBuilder};

use engine::{parse_number, Row};

use crate::definition::{FilterOperator, FilterRule, NumFilterRule, NumericOperator};

// ============================================================================
// FILTER APPLICATION
// ============================================================================

/// Apply the filter rule lists to the rows. Rules with an empty `column`
/// are skipped; every remaining rule must pass for a row to survive.
pub fn apply_filters(rows: &[Row], rules: &[FilterRule], num_rules: &[NumFilterRule]) -> Vec<Row> {
    // User regex patterns are compiled once per pass, not once per row.
    let compiled: Vec<Option<Regex>> = rules
        .iter()
        .map(|rule| {
            if rule.operator == FilterOperator::Regex && !rule.value.trim().is_empty() {
                compile_case_insensitive(rule.value.trim())
            } else {
                None
            }
        })
        .collect();

    rows.iter()
        .filter(|row| row_passes(row, rules, &compiled, num_rules))
        .cloned()
        .collect()
}

fn row_passes(
    row: &Row,
    rules: &[FilterRule],
    compiled: &[Option<Regex>],
    num_rules: &[NumFilterRule],
) -> bool {
    let general = rules.iter().zip(compiled).all(|(rule, regex)| {
        rule.column.trim().is_empty() || matches_rule(row, rule, regex.as_ref())
    });
    if !general {
        return false;
    }
    num_rules
        .iter()
        .all(|rule| rule.column.trim().is_empty() || matches_num_rule(row, rule))
}

fn matches_rule(row: &Row, rule: &FilterRule, regex: Option<&Regex>) -> bool {
    let raw = row.raw(&rule.column);
    let text = raw.trim();
    let value = rule.value.trim();

    match rule.operator {
        // Text family: an empty pattern leaves the rule unconfigured and
        // passes every row.
        FilterOperator::Contains => value.is_empty() || text.contains(value),
        FilterOperator::NotContains => value.is_empty() || !text.contains(value),
        FilterOperator::Equals => value.is_empty() || equals_loose(text, value),
        FilterOperator::NotEquals => value.is_empty() || !equals_loose(text, value),
        FilterOperator::StartsWith => value.is_empty() || text.starts_with(value),
        FilterOperator::EndsWith => value.is_empty() || text.ends_with(value),
        // Emptiness inspects the trimmed raw string only, independent of
        // whether the value would parse.
        FilterOperator::NotEmpty => !text.is_empty(),
        FilterOperator::IsEmpty => text.is_empty(),
        // A pattern that failed to compile evaluates to non-match.
        FilterOperator::Regex => {
            value.is_empty() || regex.map(|re| re.is_match(text)).unwrap_or(false)
        }
        FilterOperator::GreaterThan => {
            numeric_matches(NumericOperator::GreaterThan, text, value, None)
        }
        FilterOperator::LessThan => numeric_matches(NumericOperator::LessThan, text, value, None),
        FilterOperator::GreaterOrEqual => {
            numeric_matches(NumericOperator::GreaterOrEqual, text, value, None)
        }
        FilterOperator::LessOrEqual => {
            numeric_matches(NumericOperator::LessOrEqual, text, value, None)
        }
        FilterOperator::Between => numeric_matches(
            NumericOperator::Between,
            text,
            value,
            rule.value2.as_deref(),
        ),
        // Legacy multi-select: an empty allow-set shows everything.
        FilterOperator::InSet => {
            rule.values.is_empty() || rule.values.iter().any(|v| v.trim() == text)
        }
    }
}

fn matches_num_rule(row: &Row, rule: &NumFilterRule) -> bool {
    let raw = row.raw(&rule.column);
    numeric_matches(
        rule.operator,
        raw.trim(),
        rule.value.trim(),
        rule.value2.as_deref(),
    )
}

// ============================================================================
// SHARED MATCH HELPERS
// ============================================================================

/// Equality that compares numerically when both sides parse as numbers and
/// falls back to exact string comparison otherwise.
pub(crate) fn equals_loose(text: &str, value: &str) -> bool {
    match (parse_number(text), parse_number(value)) {
        (Some(a), Some(b)) => a == b,
        _ => text == value,
    }
}

/// Numeric comparison of a cell string against the rule value(s).
///
/// `between` requires both bounds to parse; if either fails, the row fails
/// the rule. The single-bound operators treat an empty value as
/// unconfigured (pass), an unparsable value or cell as non-match.
pub(crate) fn numeric_matches(
    op: NumericOperator,
    cell_text: &str,
    value: &str,
    value2: Option<&str>,
) -> bool {
    if op == NumericOperator::Between {
        let (lo, hi) = match (parse_number(value), value2.and_then(parse_number)) {
            (Some(a), Some(b)) => (a.min(b), a.max(b)),
            _ => return false,
        };
        return match parse_number(cell_text) {
            Some(n) => n >= lo && n <= hi,
            None => false,
        };
    }

    if value.is_empty() {
        return true;
    }
    let bound = match parse_number(value) {
        Some(b) => b,
        None => return false,
    };
    let cell = match parse_number(cell_text) {
        Some(n) => n,
        None => return false,
    };
    match op {
        NumericOperator::GreaterThan => cell > bound,
        NumericOperator::LessThan => cell < bound,
        NumericOperator::GreaterOrEqual => cell >= bound,
        NumericOperator::LessOrEqual => cell <= bound,
        NumericOperator::Equals => cell == bound,
        NumericOperator::NotEquals => cell != bound,
        NumericOperator::Between => unreachable!("handled above"),
    }
}

/// Compile a user pattern case-insensitively. Compile failure is a
/// recoverable configuration problem: log and degrade to non-match.
pub(crate) fn compile_case_insensitive(pattern: &str) -> Option<Regex> {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(re) => Some(re),
        Err(err) => {
            log::warn!("invalid filter regex pattern '{}': {}", pattern, err);
            None
        }
    }
}
