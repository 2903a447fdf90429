//! FILENAME: engine/src/cell.rs
//! PURPOSE: Defines the fundamental data structures for a single table cell
//! and a row of cells.
//! CONTEXT: This file contains the `CellValue` enum and the `Row` struct.
//! Cells are loosely typed: a string may stand in for a number, a date, a
//! categorical code, or free text. It is designed to be lightweight as
//! thousands of these instances may exist per view.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Represents the raw data within a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Date(NaiveDateTime),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    pub fn number(n: f64) -> Self {
        CellValue::Number(n)
    }

    pub fn date(d: NaiveDateTime) -> Self {
        CellValue::Date(d)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Returns the display value of the cell as a String.
    /// This is the string all text operators, groupers, and sorters see.
    pub fn display_value(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => {
                // Format without unnecessary decimal places
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{:.0}", n)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Text(s) => s.clone(),
            CellValue::Date(d) => {
                if d.time() == chrono::NaiveTime::MIN {
                    d.format("%Y-%m-%d").to_string()
                } else {
                    d.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

/// One row of tabular data: an ordered mapping from column name to value.
///
/// Rows are immutable inputs to the view engine; the engine never mutates a
/// row, it only selects, reorders, and tags them with a derived group key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    cells: Vec<(String, CellValue)>,
}

impl Row {
    pub fn new() -> Self {
        Row { cells: Vec::new() }
    }

    /// Build a row from (column, value) pairs, keeping their order.
    pub fn from_cells(cells: Vec<(String, CellValue)>) -> Self {
        Row { cells }
    }

    /// Set a cell, replacing an existing column of the same name or
    /// appending a new one at the end.
    pub fn set(&mut self, column: impl Into<String>, value: CellValue) {
        let column = column.into();
        if let Some(slot) = self.cells.iter_mut().find(|(name, _)| *name == column) {
            slot.1 = value;
        } else {
            self.cells.push((column, value));
        }
    }

    /// Get the value of a column. `None` when the row has no such column.
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// The display string for a column. A missing column reads as `""`,
    /// which flows through the same null-handling paths as an empty cell.
    pub fn raw(&self, column: &str) -> String {
        self.get(column)
            .map(|v| v.display_value())
            .unwrap_or_default()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &CellValue> {
        self.cells.iter().map(|(_, value)| value)
    }

    pub fn cells(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
