//! FILENAME: engine/src/group_key.rs
//! PURPOSE: Classifies a cell value into the typed key used for grouping
//! and for default sort tie-breaks.
//! CONTEXT: A "numbered text" such as "3. 北京" carries its own ordering in
//! the digit prefix; a date-like string groups by its normalized date. This
//! classification underlies both default grouping and default sorting.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::cell::CellValue;
use crate::date_parse::parse_date_str;

/// The semantic kind of a parsed group key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupKeyKind {
    Date,
    Number,
    Text,
    NumberedText,
}

/// The parsed, typed representation of a cell value for grouping purposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupKey {
    /// The map key rows are grouped under.
    pub key: String,
    pub kind: GroupKeyKind,
    /// Numeric sort priority. Only numbered-text values carry one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<f64>,
    /// The full original text, when it differs from `key`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
}

/// A `YYYY-MM-DD`-like prefix (also `/` and `.` separated).
static DATE_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}[-/.]\d{1,2}[-/.]\d{1,2}").unwrap());

/// A numbered prefix: digits followed by `.` or `、` and a non-digit (or end
/// of string), so decimals like "1.5" do not classify as numbered text.
static NUMBERED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)[.、](?:[^0-9]|$)").unwrap());

/// Classify a cell value.
///
/// Dates win over numbered text (so "2024.1.3" is a date, not "item 2024").
/// For numbered text the sort key is the **minimum** digit run found and
/// the display text is the full original string. Returns `None` for empty
/// values and blank text.
pub fn parse_group_key(value: &CellValue) -> Option<GroupKey> {
    match value {
        CellValue::Empty => None,
        CellValue::Date(d) => Some(GroupKey {
            key: d.format("%Y-%m-%d").to_string(),
            kind: GroupKeyKind::Date,
            sort_key: None,
            display_text: Some(value.display_value()),
        }),
        CellValue::Number(_) => Some(GroupKey {
            key: value.display_value(),
            kind: GroupKeyKind::Number,
            sort_key: None,
            display_text: None,
        }),
        CellValue::Text(s) => parse_text_key(s),
    }
}

fn parse_text_key(s: &str) -> Option<GroupKey> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(m) = DATE_PREFIX_RE.find(trimmed) {
        if let Some(dt) = parse_date_str(m.as_str()) {
            return Some(GroupKey {
                key: dt.format("%Y-%m-%d").to_string(),
                kind: GroupKeyKind::Date,
                sort_key: None,
                display_text: Some(s.to_string()),
            });
        }
    }

    let min_prefix = NUMBERED_RE
        .captures_iter(trimmed)
        .filter_map(|caps| caps[1].parse::<f64>().ok())
        .fold(None::<f64>, |acc, n| Some(acc.map_or(n, |a| a.min(n))));

    if let Some(sort_key) = min_prefix {
        return Some(GroupKey {
            key: trimmed.to_string(),
            kind: GroupKeyKind::NumberedText,
            sort_key: Some(sort_key),
            display_text: Some(s.to_string()),
        });
    }

    Some(GroupKey {
        key: trimmed.to_string(),
        kind: GroupKeyKind::Text,
        sort_key: None,
        display_text: None,
    })
}
