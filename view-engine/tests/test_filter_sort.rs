//! FILENAME: tests/test_filter_sort.rs
//! Integration tests for the filter and sort engines.

mod common;

use common::{text_row, PeopleFixture};
use view_engine::{apply_filters, sorted, FilterOperator, FilterRule, SortRule};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn rule(column: &str, operator: FilterOperator, value: &str) -> FilterRule {
    FilterRule {
        column: column.to_string(),
        operator,
        value: value.to_string(),
        value2: None,
        values: Vec::new(),
    }
}

fn sort_rule(column: &str, descending: bool) -> SortRule {
    SortRule {
        column: column.to_string(),
        descending,
    }
}

// ============================================================================
// FILTER TESTS
// ============================================================================

#[test]
fn test_filter_chain_contains_and_age() {
    // 5 rows, 2 contain "Li" in name, of which 1 has age >= 18
    let rows = PeopleFixture::rows();
    let rules = vec![
        rule("name", FilterOperator::Contains, "Li"),
        rule("age", FilterOperator::GreaterOrEqual, "18"),
    ];
    let kept = apply_filters(&rows, &rules, &[]);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].raw("name"), "Li Lei");
}

#[test]
fn test_filter_subset_law() {
    let rows = PeopleFixture::rows();
    let rules = vec![rule("age", FilterOperator::LessThan, "21")];
    let kept = apply_filters(&rows, &rules, &[]);
    assert!(kept.len() <= rows.len());
    for row in &kept {
        assert!(rows.contains(row));
    }
}

#[test]
fn test_filter_order_invariance() {
    let rows = PeopleFixture::rows();
    let a = rule("name", FilterOperator::Contains, "a");
    let b = rule("age", FilterOperator::GreaterThan, "16");
    let ab = apply_filters(&rows, &[a.clone(), b.clone()], &[]);
    let ba = apply_filters(&rows, &[b, a], &[]);
    assert_eq!(ab, ba);
}

#[test]
fn test_filter_empty_rules_keep_everything() {
    let rows = PeopleFixture::rows();
    assert_eq!(apply_filters(&rows, &[], &[]).len(), rows.len());
}

// ============================================================================
// SORT TESTS
// ============================================================================

#[test]
fn test_sort_idempotence() {
    let rows = PeopleFixture::rows();
    let rules = vec![sort_rule("age", false)];
    let once = sorted(rows, &rules);
    let twice = sorted(once.clone(), &rules);
    assert_eq!(once, twice);
}

#[test]
fn test_sort_stability_preserves_input_order_on_ties() {
    let rows = vec![
        text_row(&[("group", "a"), ("id", "first")]),
        text_row(&[("group", "a"), ("id", "second")]),
        text_row(&[("group", "a"), ("id", "third")]),
    ];
    let sorted_rows = sorted(rows, &[sort_rule("group", false)]);
    let ids: Vec<String> = sorted_rows.iter().map(|r| r.raw("id")).collect();
    assert_eq!(ids, vec!["first", "second", "third"]);
}

#[test]
fn test_sort_numeric_then_name() {
    let rows = PeopleFixture::rows();
    let sorted_rows = sorted(rows, &[sort_rule("age", true)]);
    let ages: Vec<String> = sorted_rows.iter().map(|r| r.raw("age")).collect();
    assert_eq!(ages, vec!["30", "25", "20", "17", "16"]);
}

#[test]
fn test_sort_unit_suffixed_prices_numerically() {
    let rows = vec![
        text_row(&[("price", "1.2万")]),
        text_row(&[("price", "8000")]),
        text_row(&[("price", "2.5万")]),
    ];
    let sorted_rows = sorted(rows, &[sort_rule("price", false)]);
    let prices: Vec<String> = sorted_rows.iter().map(|r| r.raw("price")).collect();
    assert_eq!(prices, vec!["8000", "1.2万", "2.5万"]);
}
