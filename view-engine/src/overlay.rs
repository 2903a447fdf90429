//! FILENAME: view-engine/src/overlay.rs
//! PURPOSE: Manual classification overrides layered over computed grouping.
//! CONTEXT: A user can drag a row into a group by hand; that assignment is
//! stored against the row's stable identity (its extracted media reference,
//! never its position) and wins over every computed key. This is a wrapping
//! decorator around the grouping engine, not a branch inside it.

use rustc_hash::FxHashMap;

use engine::{CellValue, Row};

use crate::group::ComputedKey;

/// Host-supplied routine that decides whether a cell value is a displayable
/// media reference. The engine only calls it; it never interprets the cell
/// content itself.
pub trait MediaRefExtractor {
    fn extract(&self, cell: &CellValue) -> Option<String>;
}

impl<F> MediaRefExtractor for F
where
    F: Fn(&CellValue) -> Option<String>,
{
    fn extract(&self, cell: &CellValue) -> Option<String> {
        self(cell)
    }
}

/// Extractor for hosts without displayable media: no row has an identity,
/// so no override ever applies.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMedia;

impl MediaRefExtractor for NoMedia {
    fn extract(&self, _cell: &CellValue) -> Option<String> {
        None
    }
}

/// Externally-owned map from row identity to a manually assigned group
/// label. Consulted, never mutated, by the engine.
pub type ClassificationOverrides = FxHashMap<String, String>;

/// The decorator composing the override map with a computed group key.
pub struct ClassificationOverlay<'a> {
    overrides: &'a ClassificationOverrides,
    extractor: &'a dyn MediaRefExtractor,
}

impl<'a> ClassificationOverlay<'a> {
    pub fn new(
        overrides: &'a ClassificationOverrides,
        extractor: &'a dyn MediaRefExtractor,
    ) -> Self {
        ClassificationOverlay {
            overrides,
            extractor,
        }
    }

    /// The stable identity of a row: its first extractable media reference,
    /// scanning cells in column order.
    pub fn row_identity(&self, row: &Row) -> Option<String> {
        row.values().find_map(|cell| self.extractor.extract(cell))
    }

    /// Whether the row carries a displayable item (used for statistics).
    pub fn has_media(&self, row: &Row) -> bool {
        self.row_identity(row).is_some()
    }

    /// Manual override wins unconditionally; otherwise the computed key
    /// passes through unchanged. An overridden row carries none of the
    /// computed ordering metadata - its group orders like any other label.
    pub fn resolve(&self, row: &Row, computed: ComputedKey) -> ComputedKey {
        match self
            .row_identity(row)
            .and_then(|id| self.overrides.get(&id))
        {
            Some(label) => ComputedKey::plain(label.clone()),
            None => computed,
        }
    }
}
