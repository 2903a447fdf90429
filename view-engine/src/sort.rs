//! FILENAME: view-engine/src/sort.rs
//! PURPOSE: Multi-criteria type-aware row sorting.
//! CONTEXT: One stable comparison pass consults the sort rules in order and
//! returns the first non-zero result. Per cell pair: numeric comparison when
//! both sides parse as numbers, timestamp comparison when both look like and
//! parse as dates, natural string comparison otherwise. Stability guarantees
//! deterministic group order downstream when rows tie on every rule.

use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex::Regex;

use engine::{parse_date_str, parse_number_strict, Row};

use crate::definition::SortRule;

/// Cheap gate before attempting a date parse: a digit-separator-digit
/// sequence or a CJK date character.
static DATE_LIKE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d[-/.]\d|[年月日]").unwrap());

/// Sort rows in place by the rule chain. Rules with an empty column are
/// skipped. The underlying sort is stable.
pub fn sort_rows(rows: &mut [Row], rules: &[SortRule]) {
    let active: Vec<&SortRule> = rules
        .iter()
        .filter(|rule| !rule.column.trim().is_empty())
        .collect();
    if active.is_empty() {
        return;
    }

    rows.sort_by(|a, b| {
        for rule in &active {
            let ord = compare_cells(&a.raw(&rule.column), &b.raw(&rule.column));
            if ord != Ordering::Equal {
                return if rule.descending { ord.reverse() } else { ord };
            }
        }
        Ordering::Equal
    });
}

/// Owning convenience wrapper around `sort_rows`.
pub fn sorted(mut rows: Vec<Row>, rules: &[SortRule]) -> Vec<Row> {
    sort_rows(&mut rows, rules);
    rows
}

/// Compare two cell strings for one sort rule.
///
/// When both parse as numbers the numeric result is final (equal numbers
/// hand over to the next rule, not to the string comparison). A lone
/// parsable number is incomparable and falls through to the date and string
/// families. The strict parser keeps date strings out of the numeric
/// family.
pub(crate) fn compare_cells(a: &str, b: &str) -> Ordering {
    let a = a.trim();
    let b = b.trim();

    if let (Some(x), Some(y)) = (parse_number_strict(a), parse_number_strict(b)) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }

    if DATE_LIKE_RE.is_match(a) && DATE_LIKE_RE.is_match(b) {
        if let (Some(da), Some(db)) = (parse_date_str(a), parse_date_str(b)) {
            return da.cmp(&db);
        }
    }

    natural_cmp(a, b)
}

/// Case-insensitive string comparison with numeric-aware digit runs, so
/// "item2" orders before "item10".
pub(crate) fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ca = a.chars().peekable();
    let mut cb = b.chars().peekable();

    loop {
        match (ca.peek().copied(), cb.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                if x.is_ascii_digit() && y.is_ascii_digit() {
                    let run_a = take_digits(&mut ca);
                    let run_b = take_digits(&mut cb);
                    let ord = compare_digit_runs(&run_a, &run_b);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                } else {
                    let ord = x.to_lowercase().cmp(y.to_lowercase());
                    if ord != Ordering::Equal {
                        return ord;
                    }
                    ca.next();
                    cb.next();
                }
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek() {
        if c.is_ascii_digit() {
            run.push(*c);
            chars.next();
        } else {
            break;
        }
    }
    run
}

/// Compare two digit runs as integers without parsing (runs may exceed u64).
fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::CellValue;

    fn row2(a: &str, b: &str) -> Row {
        Row::from_cells(vec![
            ("k".to_string(), CellValue::text(a)),
            ("v".to_string(), CellValue::text(b)),
        ])
    }

    fn rule(column: &str, descending: bool) -> SortRule {
        SortRule {
            column: column.to_string(),
            descending,
        }
    }

    fn keys(rows: &[Row]) -> Vec<String> {
        rows.iter().map(|r| r.raw("k")).collect()
    }

    #[test]
    fn test_numeric_before_lexicographic() {
        let rows = vec![row2("100", "a"), row2("20", "b"), row2("3", "c")];
        let sorted = sorted(rows, &[rule("k", false)]);
        assert_eq!(keys(&sorted), vec!["3", "20", "100"]);
    }

    #[test]
    fn test_descending_negates_single_rule_only() {
        let rows = vec![
            row2("1", "b"),
            row2("1", "a"),
            row2("2", "a"),
        ];
        let sorted = sorted(rows, &[rule("k", true), rule("v", false)]);
        assert_eq!(keys(&sorted), vec!["2", "1", "1"]);
        assert_eq!(sorted[1].raw("v"), "a");
        assert_eq!(sorted[2].raw("v"), "b");
    }

    #[test]
    fn test_date_comparison() {
        let rows = vec![
            row2("2024年3月5日", "x"),
            row2("2023-12-31", "y"),
            row2("2024/1/2", "z"),
        ];
        let sorted = sorted(rows, &[rule("k", false)]);
        assert_eq!(
            keys(&sorted),
            vec!["2023-12-31", "2024/1/2", "2024年3月5日"]
        );
    }

    #[test]
    fn test_mixed_number_and_text_fall_to_string() {
        // "9" parses, "alpha" does not: incomparable numerically, compared
        // as strings where digits order before letters
        let rows = vec![row2("alpha", ""), row2("9", "")];
        let sorted = sorted(rows, &[rule("k", false)]);
        assert_eq!(keys(&sorted), vec!["9", "alpha"]);
    }

    #[test]
    fn test_natural_ordering_of_embedded_numbers() {
        let rows = vec![row2("item10", ""), row2("item2", ""), row2("item1", "")];
        let sorted = sorted(rows, &[rule("k", false)]);
        assert_eq!(keys(&sorted), vec!["item1", "item2", "item10"]);
    }

    #[test]
    fn test_stability_on_full_tie() {
        let rows = vec![row2("same", "first"), row2("same", "second")];
        let sorted = sorted(rows, &[rule("k", false)]);
        assert_eq!(sorted[0].raw("v"), "first");
        assert_eq!(sorted[1].raw("v"), "second");
    }

    #[test]
    fn test_idempotence() {
        let rows = vec![row2("b", "1"), row2("a", "2"), row2("a", "3")];
        let once = sorted(rows, &[rule("k", false)]);
        let twice = sorted(once.clone(), &[rule("k", false)]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_rules_keep_order() {
        let rows = vec![row2("b", ""), row2("a", "")];
        let sorted = sorted(rows, &[]);
        assert_eq!(keys(&sorted), vec!["b", "a"]);
    }

    #[test]
    fn test_equal_numbers_hand_over_to_next_rule() {
        let rows = vec![row2("1.0", "b"), row2("1", "a")];
        let sorted = sorted(rows, &[rule("k", false), rule("v", false)]);
        assert_eq!(sorted[0].raw("v"), "a");
    }
}
