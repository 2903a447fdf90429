//! FILENAME: view-engine/src/engine.rs
//! PURPOSE: View Engine - the calculation core that transforms rows into a
//! renderable grouped view.
//!
//! Algorithm:
//! 1. Normalize the configuration into one canonical grouping mode
//! 2. Filter the rows (AND-combined rule lists)
//! 3. Sort with the stable multi-criteria comparator
//! 4. Group: compute each row's key, let the classification overlay
//!    resolve it, accumulate, and order the groups
//!
//! The whole pass is a pure function of its inputs. Hosts that recompute on
//! every dependency change wrap it in a `ViewCache` keyed by a content hash
//! so unchanged inputs return the previous view without recomputation.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHashMap;

use engine::Row;

use crate::definition::{GroupingMode, ViewConfig};
use crate::filter::apply_filters;
use crate::group::{compute_key, GroupAccumulator};
use crate::overlay::{ClassificationOverlay, ClassificationOverrides, MediaRefExtractor};
use crate::sort::sorted;
use crate::view::{GroupedView, UniqueValue, UniqueValuesSummary};

// ============================================================================
// CALCULATION
// ============================================================================

/// Run the full transformation: filter, sort, group.
///
/// `overrides` maps row identities (extracted media references) to manual
/// group labels; `extractor` is the host routine that recognizes them.
pub fn calculate_view(
    rows: &[Row],
    config: &ViewConfig,
    overrides: &ClassificationOverrides,
    extractor: &dyn MediaRefExtractor,
) -> GroupedView {
    let mode = config.normalize();

    let filtered = apply_filters(rows, &config.filters, &config.num_filters);
    let flat = sorted(filtered, &config.sorts);

    let groups = match &mode {
        GroupingMode::None => Vec::new(),
        _ => {
            let overlay = ClassificationOverlay::new(overrides, extractor);
            let mut accumulator = GroupAccumulator::new(&mode);
            for row in &flat {
                let computed = compute_key(row, &mode);
                let resolved = overlay.resolve(row, computed);
                let has_media = overlay.has_media(row);
                accumulator.push(row.clone(), resolved, has_media);
            }
            accumulator.finish()
        }
    };

    GroupedView { rows: flat, groups }
}

/// Distinct trimmed display values of a column with occurrence counts,
/// sorted by value. Blank cells are reported separately.
pub fn column_unique_values(rows: &[Row], column: &str) -> UniqueValuesSummary {
    let mut counts: FxHashMap<String, u32> = FxHashMap::default();
    let mut has_blanks = false;

    for row in rows {
        let raw = row.raw(column);
        let value = raw.trim();
        if value.is_empty() {
            has_blanks = true;
        } else {
            *counts.entry(value.to_string()).or_insert(0) += 1;
        }
    }

    let mut values: Vec<UniqueValue> = counts
        .into_iter()
        .map(|(value, count)| UniqueValue { value, count })
        .collect();
    values.sort_by(|a, b| a.value.cmp(&b.value));

    UniqueValuesSummary { values, has_blanks }
}

// ============================================================================
// MEMOIZATION
// ============================================================================

/// Single-entry memoization cache for hosts that recompute the view inside
/// a reactive cycle. The key is a content hash of the configuration and
/// override map combined with a caller-supplied data version; bump the
/// version whenever the row set changes.
#[derive(Debug, Default)]
pub struct ViewCache {
    hash: Option<u64>,
    view: GroupedView,
}

impl ViewCache {
    pub fn new() -> Self {
        ViewCache::default()
    }

    /// Return the cached view when nothing changed, recompute otherwise.
    pub fn get_or_compute(
        &mut self,
        data_version: u64,
        rows: &[Row],
        config: &ViewConfig,
        overrides: &ClassificationOverrides,
        extractor: &dyn MediaRefExtractor,
    ) -> &GroupedView {
        let hash = Self::input_hash(data_version, config, overrides);
        if self.hash != Some(hash) {
            self.view = calculate_view(rows, config, overrides, extractor);
            self.hash = Some(hash);
        }
        &self.view
    }

    /// Drop the cached view (e.g. when the extractor behavior changes).
    pub fn invalidate(&mut self) {
        self.hash = None;
        self.view = GroupedView::default();
    }

    fn input_hash(
        data_version: u64,
        config: &ViewConfig,
        overrides: &ClassificationOverrides,
    ) -> u64 {
        let mut hasher = rustc_hash::FxHasher::default();
        data_version.hash(&mut hasher);
        config.hash(&mut hasher);

        // Map iteration order is arbitrary; hash the entries sorted
        let mut entries: Vec<(&String, &String)> = overrides.iter().collect();
        entries.sort();
        entries.hash(&mut hasher);

        hasher.finish()
    }
}
