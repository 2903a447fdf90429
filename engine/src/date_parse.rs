//! FILENAME: engine/src/date_parse.rs
//! PURPOSE: Heuristic date parsing, including legacy spreadsheet serials.
//! CONTEXT: Date cells arrive as native dates, serial numbers exported from
//! spreadsheets, or strings in several regional formats. All failures
//! degrade to `None`; nothing here panics on malformed input.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::cell::CellValue;

/// Spreadsheet serials count days from this anchor. The off-by-two against
/// 1900-01-01 reproduces the legacy leap-year bug, so serial 1 lands on
/// 1899-12-31 and serial 44562 on 2022-01-01.
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Serials outside `[1, 100000)` are treated as plain numbers, not dates.
const SERIAL_MIN: f64 = 1.0;
const SERIAL_MAX: f64 = 100_000.0;

static SERIAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)?$").unwrap());

static CJK_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})年(\d{1,2})月(\d{1,2})日$").unwrap());

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%m/%d/%Y"];

/// Convert a spreadsheet serial to a timestamp:
/// epoch anchor + `serial * 86_400_000` milliseconds.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let (y, m, d) = SERIAL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

/// Parse a date from a cell string.
///
/// Numeric-looking strings in the serial range convert via the fixed epoch;
/// everything else goes through the known string formats, then the
/// `"YYYY年M月D日"` pattern. `None` on total failure.
pub fn parse_date_str(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if SERIAL_RE.is_match(trimmed) {
        let serial = trimmed.parse::<f64>().ok()?;
        if (SERIAL_MIN..SERIAL_MAX).contains(&serial) {
            return excel_serial_to_datetime(serial);
        }
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local());
    }

    if let Some(caps) = CJK_DATE_RE.captures(trimmed) {
        let y: i32 = caps[1].parse().ok()?;
        let m: u32 = caps[2].parse().ok()?;
        let d: u32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(y, m, d)?.and_hms_opt(0, 0, 0);
    }

    None
}

/// Parse a date out of any cell value. Native dates pass through; native
/// numbers in the serial range convert; text goes through `parse_date_str`.
pub fn parse_date_value(value: &CellValue) -> Option<NaiveDateTime> {
    match value {
        CellValue::Date(d) => Some(*d),
        CellValue::Number(n) => {
            if (SERIAL_MIN..SERIAL_MAX).contains(n) {
                excel_serial_to_datetime(*n)
            } else {
                None
            }
        }
        CellValue::Text(s) => parse_date_str(s),
        CellValue::Empty => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_serial_one_is_last_day_of_1899() {
        assert_eq!(excel_serial_to_datetime(1.0), Some(ymd(1899, 12, 31)));
    }

    #[test]
    fn test_serial_44562_is_new_year_2022() {
        assert_eq!(excel_serial_to_datetime(44562.0), Some(ymd(2022, 1, 1)));
    }

    #[test]
    fn test_serial_fraction_is_time_of_day() {
        let dt = excel_serial_to_datetime(44562.5).unwrap();
        assert_eq!(dt.date(), ymd(2022, 1, 1).date());
        assert_eq!(dt.time(), chrono::NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    }

    #[test]
    fn test_serial_string_in_range() {
        assert_eq!(parse_date_str("44562"), Some(ymd(2022, 1, 1)));
    }

    #[test]
    fn test_numeric_string_out_of_range_is_not_a_date() {
        assert_eq!(parse_date_str("0.5"), None);
        assert_eq!(parse_date_str("123456"), None);
    }

    #[test]
    fn test_common_formats() {
        assert_eq!(parse_date_str("2024-03-05"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date_str("2024/3/5"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date_str("2024.03.05"), Some(ymd(2024, 3, 5)));
        assert_eq!(
            parse_date_str("2024-03-05 08:30:00"),
            ymd(2024, 3, 5).date().and_hms_opt(8, 30, 0)
        );
    }

    #[test]
    fn test_cjk_format() {
        assert_eq!(parse_date_str("2024年3月5日"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date_str("2024年12月31日"), Some(ymd(2024, 12, 31)));
    }

    #[test]
    fn test_garbage_is_none() {
        assert_eq!(parse_date_str("not a date"), None);
        assert_eq!(parse_date_str("2024年13月40日"), None);
    }

    #[test]
    fn test_native_values() {
        assert_eq!(parse_date_value(&CellValue::Date(ymd(2023, 6, 1))), Some(ymd(2023, 6, 1)));
        assert_eq!(parse_date_value(&CellValue::Number(44562.0)), Some(ymd(2022, 1, 1)));
        assert_eq!(parse_date_value(&CellValue::Number(2_000_000.0)), None);
        assert_eq!(parse_date_value(&CellValue::Empty), None);
    }
}
