//! FILENAME: engine/src/lib.rs
//! PURPOSE: Main library entry point for the value engine.
//! CONTEXT: Re-exports the cell model and the heuristic parsers for use by
//! the view-engine crate and the host application.

pub mod cell;
pub mod date_parse;
pub mod group_key;
pub mod number_parse;

// Re-export commonly used types at the crate root
pub use cell::{CellValue, Row};
pub use date_parse::{excel_serial_to_datetime, parse_date_str, parse_date_value};
pub use group_key::{parse_group_key, GroupKey, GroupKeyKind};
pub use number_parse::{parse_number, parse_number_strict};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_builds_rows() {
        let mut row = Row::new();
        row.set("price", CellValue::text("1.5万"));
        assert_eq!(parse_number(&row.raw("price")), Some(15000.0));
    }

    #[test]
    fn it_classifies_cells() {
        let key = parse_group_key(&CellValue::text("3.北京")).unwrap();
        assert_eq!(key.kind, GroupKeyKind::NumberedText);
    }
}
