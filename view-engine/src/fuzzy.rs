//! FILENAME: view-engine/src/fuzzy.rs
//! PURPOSE: Grammar and parser for fuzzy keyword-merge rules.
//! CONTEXT: A merge-rule string like "一线,首都=重点城市;二线=普通城市"
//! collapses many raw text values into one group label via substring hits.
//! The string is parsed once into structured rules; the engine never
//! re-splits it per row.
//!
//! Grammar:
//!   rules  := entry ((";" | "|") entry)*
//!   entry  := keyword ("," keyword)* "=" target
//! Full-width separators (；，＝) are accepted alongside their ASCII forms.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One parsed merge rule: any keyword hit maps the cell to `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuzzyRule {
    pub keywords: Vec<String>,
    pub target: String,
}

impl FuzzyRule {
    /// True when any keyword occurs as a substring of `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|kw| text.contains(kw.as_str()))
    }
}

/// Errors reported by the strict parser. The entry's original text is kept
/// so the host can point the user at the offending fragment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FuzzyRuleError {
    #[error("merge rule entry '{0}' has no '=' separator")]
    MissingSeparator(String),
    #[error("merge rule entry '{0}' has no keywords before '='")]
    NoKeywords(String),
    #[error("merge rule entry '{0}' has an empty target group after '='")]
    EmptyTarget(String),
}

fn is_entry_separator(c: char) -> bool {
    matches!(c, ';' | '|' | '；')
}

fn is_keyword_separator(c: char) -> bool {
    matches!(c, ',' | '，')
}

fn parse_entry(entry: &str) -> Result<FuzzyRule, FuzzyRuleError> {
    let (keywords_part, target) = entry
        .split_once(['=', '＝'])
        .ok_or_else(|| FuzzyRuleError::MissingSeparator(entry.to_string()))?;

    let keywords: Vec<String> = keywords_part
        .split(is_keyword_separator)
        .map(str::trim)
        .filter(|kw| !kw.is_empty())
        .map(str::to_string)
        .collect();
    if keywords.is_empty() {
        return Err(FuzzyRuleError::NoKeywords(entry.to_string()));
    }

    let target = target.trim();
    if target.is_empty() {
        return Err(FuzzyRuleError::EmptyTarget(entry.to_string()));
    }

    Ok(FuzzyRule {
        keywords,
        target: target.to_string(),
    })
}

/// Strict parse: the first malformed entry aborts with a typed error.
/// Blank entries (stray separators) are not an error.
pub fn parse_rules(input: &str) -> Result<Vec<FuzzyRule>, FuzzyRuleError> {
    input
        .split(is_entry_separator)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_entry)
        .collect()
}

/// Lenient parse for the engine path: malformed entries are logged as
/// recoverable configuration warnings and skipped.
pub fn parse_rules_lenient(input: &str) -> Vec<FuzzyRule> {
    input
        .split(is_entry_separator)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match parse_entry(entry) {
            Ok(rule) => Some(rule),
            Err(err) => {
                log::warn!("ignoring malformed fuzzy merge rule: {}", err);
                None
            }
        })
        .collect()
}
