//! FILENAME: tests/common/mod.rs
//! Test fixtures for view-engine integration tests.

use engine::{CellValue, Row};

/// Build a row of text cells from (column, value) pairs.
pub fn text_row(pairs: &[(&str, &str)]) -> Row {
    Row::from_cells(
        pairs
            .iter()
            .map(|(column, value)| (column.to_string(), CellValue::text(*value)))
            .collect(),
    )
}

/// Media reference extractor used by override and statistics tests:
/// any http(s) URL counts as a displayable item.
pub fn url_extractor(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Text(s) if s.starts_with("http://") || s.starts_with("https://") => {
            Some(s.clone())
        }
        _ => None,
    }
}

/// Five-person roster for the filter chain scenarios. Two names contain
/// "Li"; of those, exactly one is 18 or older.
pub struct PeopleFixture;

impl PeopleFixture {
    pub fn rows() -> Vec<Row> {
        [
            ("Li Lei", "20"),
            ("Han Meimei", "17"),
            ("Li Hua", "16"),
            ("Zhang Wei", "30"),
            ("Wang Fang", "25"),
        ]
        .iter()
        .map(|(name, age)| text_row(&[("name", name), ("age", age)]))
        .collect()
    }
}

/// Apartment listings with CJK prices, dates, and photo URLs, for the
/// grouping and override scenarios.
pub struct ListingFixture;

impl ListingFixture {
    pub fn rows() -> Vec<Row> {
        [
            ("两室一厅", "北京", "1.2万", "2024-01-15", "https://img.example.com/a.jpg"),
            ("一室一厅", "上海", "8000", "2024-01-31", "https://img.example.com/b.jpg"),
            ("三室两厅", "北京", "2.5万", "2024-02-10", ""),
            ("单间", "广州", "3500", "2024-02-28", "https://img.example.com/d.jpg"),
            ("复式", "上海", "面议", "someday", ""),
        ]
        .iter()
        .map(|(title, city, price, listed, photo)| {
            text_row(&[
                ("title", title),
                ("city", city),
                ("price", price),
                ("listed", listed),
                ("photo", photo),
            ])
        })
        .collect()
    }
}
