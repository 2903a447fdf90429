//! FILENAME: view-engine/src/highlight.rs
//! PURPOSE: Rule-based row highlighting - first matching style rule wins.
//! CONTEXT: Runs independently of filtering and grouping; the rendering
//! host calls it per visible row. Date windows are computed against an
//! explicit "today" so evaluation is deterministic and testable.

use chrono::{Datelike, Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use engine::{parse_date_str, parse_date_value, Row};

use crate::definition::{HighlightOperator, HighlightRule, NumericOperator};
use crate::filter::{compile_case_insensitive, equals_loose, numeric_matches};

/// Style applied to a row by its first matching rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightStyle {
    /// CSS color string.
    pub color: String,
    /// Border width in pixels.
    pub border_width: u8,
}

/// Border width when a matching rule leaves it unset.
const DEFAULT_BORDER_WIDTH: u8 = 3;

static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bhttps?://\S+|\bwww\.\S+").unwrap());

static IMAGE_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bhttps?://\S+\.(?:png|jpe?g|gif|webp|bmp|svg)(?:\?\S*)?").unwrap()
});

static FORMULA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*=").unwrap());

/// Evaluate the rule list against one row. Rules run in list order,
/// disabled rules are skipped, and the first match wins - rules do not
/// combine.
pub fn evaluate(row: &Row, rules: &[HighlightRule], today: NaiveDate) -> Option<HighlightStyle> {
    rules
        .iter()
        .filter(|rule| rule.enabled && !rule.column.trim().is_empty())
        .find(|rule| matches_rule(row, rule, today))
        .map(|rule| HighlightStyle {
            color: rule.color.clone(),
            border_width: rule.border_width.unwrap_or(DEFAULT_BORDER_WIDTH),
        })
}

/// Convenience wrapper using the current local date.
pub fn evaluate_today(row: &Row, rules: &[HighlightRule]) -> Option<HighlightStyle> {
    evaluate(row, rules, chrono::Local::now().date_naive())
}

fn matches_rule(row: &Row, rule: &HighlightRule, today: NaiveDate) -> bool {
    let raw = row.raw(&rule.column);
    let text = raw.trim();
    let value = rule.value.trim();

    let cell_date = || {
        row.get(&rule.column)
            .and_then(parse_date_value)
            .map(|dt| dt.date())
    };

    match rule.operator {
        HighlightOperator::Contains => !value.is_empty() && text.contains(value),
        HighlightOperator::NotContains => !value.is_empty() && !text.contains(value),
        HighlightOperator::Equals => !value.is_empty() && equals_loose(text, value),
        HighlightOperator::NotEquals => !value.is_empty() && !equals_loose(text, value),
        HighlightOperator::StartsWith => !value.is_empty() && text.starts_with(value),
        HighlightOperator::EndsWith => !value.is_empty() && text.ends_with(value),
        HighlightOperator::NotEmpty => !text.is_empty(),
        HighlightOperator::IsEmpty => text.is_empty(),
        HighlightOperator::Regex => {
            !value.is_empty()
                && compile_case_insensitive(value)
                    .map(|re| re.is_match(text))
                    .unwrap_or(false)
        }
        HighlightOperator::GreaterThan => {
            !value.is_empty() && numeric_matches(NumericOperator::GreaterThan, text, value, None)
        }
        HighlightOperator::LessThan => {
            !value.is_empty() && numeric_matches(NumericOperator::LessThan, text, value, None)
        }
        HighlightOperator::GreaterOrEqual => {
            !value.is_empty() && numeric_matches(NumericOperator::GreaterOrEqual, text, value, None)
        }
        HighlightOperator::LessOrEqual => {
            !value.is_empty() && numeric_matches(NumericOperator::LessOrEqual, text, value, None)
        }
        HighlightOperator::Between => numeric_matches(
            NumericOperator::Between,
            text,
            value,
            rule.value2.as_deref(),
        ),
        HighlightOperator::DateEquals => match (cell_date(), parse_date_str(value)) {
            (Some(cell), Some(target)) => cell == target.date(),
            _ => false,
        },
        HighlightOperator::DateBefore => match (cell_date(), parse_date_str(value)) {
            (Some(cell), Some(target)) => cell < target.date(),
            _ => false,
        },
        HighlightOperator::DateAfter => match (cell_date(), parse_date_str(value)) {
            (Some(cell), Some(target)) => cell > target.date(),
            _ => false,
        },
        HighlightOperator::Today => cell_date() == Some(today),
        HighlightOperator::ThisWeek => match cell_date() {
            Some(cell) => {
                let week_start =
                    today - Duration::days(today.weekday().num_days_from_sunday() as i64);
                cell >= week_start && cell < week_start + Duration::days(7)
            }
            None => false,
        },
        HighlightOperator::ThisMonth => match cell_date() {
            Some(cell) => cell.year() == today.year() && cell.month() == today.month(),
            None => false,
        },
        HighlightOperator::HasLink => LINK_RE.is_match(&raw),
        HighlightOperator::HasImageLink => IMAGE_LINK_RE.is_match(&raw),
        HighlightOperator::HasFormula => FORMULA_RE.is_match(&raw),
    }
}
