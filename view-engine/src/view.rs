//! FILENAME: view-engine/src/view.rs
//! PURPOSE: Row View - Renderable output for the frontend.
//!
//! This module contains the structures the host renders: the flat
//! filtered/sorted row list for non-grouped consumers and the ordered
//! groups with their labels and statistics.

use serde::{Deserialize, Serialize};

use engine::Row;

/// One rendered group: a stable key, a human-readable label (which may
/// differ from the key for numbered-text groups), its rows in view order,
/// and the count of rows carrying a displayable media item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    pub key: String,
    pub label: String,
    pub rows: Vec<Row>,
    pub media_count: usize,
}

impl GroupView {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// The complete result of one view calculation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedView {
    /// All surviving rows, filtered and sorted, for non-grouped consumers.
    pub rows: Vec<Row>,
    /// Ordered groups. Empty when no grouping is configured.
    pub groups: Vec<GroupView>,
}

impl GroupedView {
    /// Whether any grouping produced output.
    pub fn is_grouped(&self) -> bool {
        !self.groups.is_empty()
    }
}

/// A distinct column value with its occurrence count, for filter pickers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniqueValue {
    pub value: String,
    pub count: u32,
}

/// Distinct values of one column across the row set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniqueValuesSummary {
    pub values: Vec<UniqueValue>,
    pub has_blanks: bool,
}
