//! FILENAME: tests/test_view.rs
//! End-to-end tests for the full view pipeline: filter, sort, group,
//! highlight, and the memoization cache.

mod common;

use common::{text_row, url_extractor, ListingFixture, PeopleFixture};
use view_engine::{
    calculate_view, column_unique_values, evaluate, ClassificationOverrides, FilterOperator,
    FilterRule, HighlightOperator, HighlightRule, NoMedia, SortRule, ViewCache, ViewConfig,
};

fn contains_rule(column: &str, value: &str) -> FilterRule {
    FilterRule {
        column: column.to_string(),
        operator: FilterOperator::Contains,
        value: value.to_string(),
        value2: None,
        values: Vec::new(),
    }
}

#[test]
fn test_full_pipeline_filter_sort_group() {
    let rows = ListingFixture::rows();
    let config = ViewConfig {
        filters: vec![contains_rule("title", "厅")],
        sorts: vec![SortRule {
            column: "price".to_string(),
            descending: true,
        }],
        group_column: Some("city".to_string()),
        ..Default::default()
    };
    let view = calculate_view(&rows, &config, &ClassificationOverrides::default(), &NoMedia);

    // "单间" and "复式" have no "厅"
    assert_eq!(view.rows.len(), 3);
    // flat list is sorted by numeric price descending
    let prices: Vec<String> = view.rows.iter().map(|r| r.raw("price")).collect();
    assert_eq!(prices, vec!["2.5万", "1.2万", "8000"]);
    // groups keep the flat order inside each group
    let beijing = view.groups.iter().find(|g| g.key == "北京").unwrap();
    assert_eq!(beijing.rows[0].raw("price"), "2.5万");
    assert_eq!(beijing.rows[1].raw("price"), "1.2万");
}

#[test]
fn test_flat_rows_equal_grouped_rows() {
    let rows = ListingFixture::rows();
    let config = ViewConfig {
        group_column: Some("city".to_string()),
        ..Default::default()
    };
    let view = calculate_view(&rows, &config, &ClassificationOverrides::default(), &NoMedia);
    let grouped_total: usize = view.groups.iter().map(|g| g.rows.len()).sum();
    assert_eq!(grouped_total, view.rows.len());
}

#[test]
fn test_highlight_over_view_rows() {
    let rows = PeopleFixture::rows();
    let view = calculate_view(
        &rows,
        &ViewConfig::default(),
        &ClassificationOverrides::default(),
        &NoMedia,
    );
    let rules = vec![HighlightRule {
        column: "age".to_string(),
        operator: HighlightOperator::GreaterOrEqual,
        value: "18".to_string(),
        value2: None,
        color: "#ffe08a".to_string(),
        border_width: None,
        enabled: true,
    }];
    let today = chrono::NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
    let highlighted = view
        .rows
        .iter()
        .filter(|row| evaluate(row, &rules, today).is_some())
        .count();
    assert_eq!(highlighted, 3);
}

#[test]
fn test_cache_returns_identical_view_without_recompute() {
    let rows = ListingFixture::rows();
    let config = ViewConfig {
        group_column: Some("city".to_string()),
        ..Default::default()
    };
    let overrides = ClassificationOverrides::default();
    let mut cache = ViewCache::new();

    let first = cache
        .get_or_compute(7, &rows, &config, &overrides, &url_extractor)
        .clone();
    let second = cache
        .get_or_compute(7, &rows, &config, &overrides, &url_extractor)
        .clone();
    assert_eq!(first, second);
}

#[test]
fn test_cache_recomputes_on_config_change() {
    let rows = ListingFixture::rows();
    let overrides = ClassificationOverrides::default();
    let mut cache = ViewCache::new();

    let all = cache
        .get_or_compute(
            7,
            &rows,
            &ViewConfig::default(),
            &overrides,
            &NoMedia,
        )
        .clone();
    assert_eq!(all.rows.len(), rows.len());

    let filtered_config = ViewConfig {
        filters: vec![contains_rule("city", "北京")],
        ..Default::default()
    };
    let filtered = cache.get_or_compute(7, &rows, &filtered_config, &overrides, &NoMedia);
    assert_eq!(filtered.rows.len(), 2);
}

#[test]
fn test_unique_values_for_filter_picker() {
    let rows = ListingFixture::rows();
    let summary = column_unique_values(&rows, "city");
    assert!(!summary.has_blanks);
    let names: Vec<&str> = summary.values.iter().map(|v| v.value.as_str()).collect();
    assert_eq!(names, vec!["上海", "北京", "广州"]);
    assert_eq!(summary.values[1].count, 2);

    let photos = column_unique_values(&rows, "photo");
    assert!(photos.has_blanks);
    assert_eq!(photos.values.len(), 3);
}

#[test]
fn test_view_serializes_for_the_host() {
    let rows = vec![text_row(&[("city", "1.上海")])];
    let config = ViewConfig {
        group_column: Some("city".to_string()),
        ..Default::default()
    };
    let view = calculate_view(&rows, &config, &ClassificationOverrides::default(), &NoMedia);
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["groups"][0]["key"], "1.上海");
    assert_eq!(json["groups"][0]["mediaCount"], 0);
}
