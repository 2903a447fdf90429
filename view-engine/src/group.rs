//! FILENAME: view-engine/src/group.rs
//! PURPOSE: Grouping Engine - computes a group key per row and assembles
//! ordered groups.
//!
//! Two modes, produced by config normalization:
//! - Multi-level: every level yields one string (numeric bin, date bin, or
//!   text bucket, with sentinel labels for misses), joined with a fixed
//!   separator into a composite key. The composite key is what the host's
//!   expand/collapse state keys off, so it must be stable and readable.
//! - Single-level (legacy): numeric binning, else text buckets, else fuzzy
//!   keyword merge, else the value's own parsed group key.
//!
//! A row joins only the FIRST matching bin, on every path; overlapping bins
//! never duplicate a row. Every row lands in exactly one group per level.

use smallvec::SmallVec;

use engine::{
    parse_date_value, parse_group_key, parse_number, CellValue, GroupKeyKind, Row,
};

use crate::definition::{
    GroupLevel, GroupLevelKind, GroupingMode, SingleLevelGrouping, TextBin, TextCondition,
    TextConditionOperator,
};
use crate::sort::natural_cmp;
use crate::view::GroupView;

// ============================================================================
// SENTINEL LABELS
// ============================================================================

/// Numeric value outside every bin (or not a number at all).
pub const OTHER_LABEL: &str = "其他";
/// Text value outside every bucket in legacy text grouping.
pub const UNGROUPED_LABEL: &str = "未分组";
/// Parsable date outside every date bin.
pub const OTHER_DATE_LABEL: &str = "其他日期";
/// Value that does not parse as a date at all.
pub const INVALID_DATE_LABEL: &str = "无效日期";
/// Blank cell in text grouping.
pub const EMPTY_LABEL: &str = "(空)";

/// Separator between the per-level strings of a composite key.
pub const LEVEL_SEPARATOR: &str = " / ";

/// Bin rank given to sentinel segments so they order after declared bins.
const SENTINEL_RANK: usize = usize::MAX;

// ============================================================================
// COMPUTED KEY
// ============================================================================

/// Ordering metadata for one level of a computed key.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LevelOrd {
    /// Declaration index of the matched bin; `SENTINEL_RANK` for sentinel
    /// segments; `None` when the level is not binned (string order).
    pub bin: Option<usize>,
    pub text: String,
}

/// The computed grouping of one row, before the classification overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedKey {
    /// The map key rows accumulate under.
    pub key: String,
    /// Numeric group priority, carried by numbered-text values.
    pub sort_key: Option<f64>,
    /// Candidate display label (the original cell text) when it may differ
    /// from the key.
    pub label: Option<String>,
    pub(crate) ord: SmallVec<[LevelOrd; 4]>,
}

impl ComputedKey {
    /// A key with no ordering metadata: manual overrides and plain labels.
    pub fn plain(key: String) -> Self {
        ComputedKey {
            key,
            sort_key: None,
            label: None,
            ord: SmallVec::new(),
        }
    }

    fn single(key: String, bin: Option<usize>) -> Self {
        let ord_text = key.clone();
        ComputedKey {
            key,
            sort_key: None,
            label: None,
            ord: SmallVec::from_elem(
                LevelOrd {
                    bin,
                    text: ord_text,
                },
                1,
            ),
        }
    }
}

// ============================================================================
// KEY COMPUTATION
// ============================================================================

/// Compute the group key of one row under the normalized grouping mode.
pub fn compute_key(row: &Row, mode: &GroupingMode) -> ComputedKey {
    match mode {
        GroupingMode::None => ComputedKey::plain(String::new()),
        GroupingMode::Multi(levels) => compute_multi(row, levels),
        GroupingMode::Single(single) => compute_single(row, single),
    }
}

fn compute_multi(row: &Row, levels: &[GroupLevel]) -> ComputedKey {
    let mut segments: Vec<String> = Vec::with_capacity(levels.len());
    let mut ord: SmallVec<[LevelOrd; 4]> = SmallVec::with_capacity(levels.len());

    for level in levels {
        let (segment, bin) = level_segment(row, level);
        ord.push(LevelOrd {
            bin,
            text: segment.clone(),
        });
        segments.push(segment);
    }

    ComputedKey {
        key: segments.join(LEVEL_SEPARATOR),
        sort_key: None,
        label: None,
        ord,
    }
}

/// One level's string for a row: first matching bin, sentinel on miss.
fn level_segment(row: &Row, level: &GroupLevel) -> (String, Option<usize>) {
    let raw = row.raw(&level.column);
    let trimmed = raw.trim();

    match &level.kind {
        GroupLevelKind::NumericBins { bins } => match parse_number(trimmed) {
            Some(n) => match bins.iter().position(|bin| bin.contains(n)) {
                Some(i) => (bins[i].label.clone(), Some(i)),
                None => (OTHER_LABEL.to_string(), Some(SENTINEL_RANK)),
            },
            None => (OTHER_LABEL.to_string(), Some(SENTINEL_RANK)),
        },
        GroupLevelKind::DateBins { bins } => {
            match row.get(&level.column).and_then(parse_date_value) {
                Some(dt) => match bins.iter().position(|bin| bin.contains(dt)) {
                    Some(i) => (bins[i].label.clone(), Some(i)),
                    None => (OTHER_DATE_LABEL.to_string(), Some(SENTINEL_RANK)),
                },
                None => (INVALID_DATE_LABEL.to_string(), Some(SENTINEL_RANK)),
            }
        }
        GroupLevelKind::Text { bins } => {
            if bins.is_empty() {
                let segment = if trimmed.is_empty() {
                    EMPTY_LABEL.to_string()
                } else {
                    trimmed.to_string()
                };
                return (segment, None);
            }
            match bins
                .iter()
                .position(|bin| text_bin_matches_inline(bin, trimmed))
            {
                Some(i) => (bins[i].label.clone(), Some(i)),
                None => {
                    let segment = if trimmed.is_empty() {
                        EMPTY_LABEL.to_string()
                    } else {
                        trimmed.to_string()
                    };
                    (segment, Some(SENTINEL_RANK))
                }
            }
        }
    }
}

/// Multi-level text matching: conditions or literal values, per bin.
fn text_bin_matches_inline(bin: &TextBin, text: &str) -> bool {
    conditions_match(&bin.conditions, text)
        || bin.exact_values.iter().any(|v| v.trim() == text)
}

/// All conditions of a non-empty list must hold.
fn conditions_match(conditions: &[TextCondition], text: &str) -> bool {
    !conditions.is_empty()
        && conditions
            .iter()
            .all(|condition| condition_matches(condition, text))
}

fn condition_matches(condition: &TextCondition, text: &str) -> bool {
    let value = condition.value.trim();
    match condition.operator {
        TextConditionOperator::Contains => !value.is_empty() && text.contains(value),
        TextConditionOperator::Equals => text == value,
        TextConditionOperator::StartsWith => !value.is_empty() && text.starts_with(value),
        TextConditionOperator::EndsWith => !value.is_empty() && text.ends_with(value),
        TextConditionOperator::GreaterThan
        | TextConditionOperator::LessThan
        | TextConditionOperator::GreaterOrEqual
        | TextConditionOperator::LessOrEqual
        | TextConditionOperator::NumEquals => {
            let (cell, bound) = match (parse_number(text), parse_number(value)) {
                (Some(a), Some(b)) => (a, b),
                _ => return false,
            };
            match condition.operator {
                TextConditionOperator::GreaterThan => cell > bound,
                TextConditionOperator::LessThan => cell < bound,
                TextConditionOperator::GreaterOrEqual => cell >= bound,
                TextConditionOperator::LessOrEqual => cell <= bound,
                TextConditionOperator::NumEquals => cell == bound,
                _ => false,
            }
        }
    }
}

/// Legacy single-level precedence: numeric bins, text buckets, fuzzy merge,
/// then the value's own parsed key.
fn compute_single(row: &Row, single: &SingleLevelGrouping) -> ComputedKey {
    let raw = row.raw(&single.column);
    let trimmed = raw.trim();

    if !single.numeric_bins.is_empty() {
        return match parse_number(trimmed) {
            Some(n) => match single.numeric_bins.iter().position(|bin| bin.contains(n)) {
                Some(i) => ComputedKey::single(single.numeric_bins[i].label.clone(), Some(i)),
                None => ComputedKey::single(OTHER_LABEL.to_string(), Some(SENTINEL_RANK)),
            },
            None => ComputedKey::single(OTHER_LABEL.to_string(), Some(SENTINEL_RANK)),
        };
    }

    if !single.text_bins.is_empty() {
        return compute_single_text(trimmed, &single.text_bins);
    }

    if let Some(rule) = single.fuzzy_rules.iter().find(|rule| rule.matches(trimmed)) {
        return ComputedKey::plain(rule.target.clone());
    }

    let cell = row.get(&single.column).unwrap_or(&CellValue::Empty);
    match parse_group_key(cell) {
        Some(parsed) => {
            let display = parsed.display_text.unwrap_or(parsed.key);
            let key = display.trim().to_string();
            let label = if parsed.kind == GroupKeyKind::NumberedText {
                Some(raw.clone())
            } else {
                None
            };
            ComputedKey {
                key,
                sort_key: parsed.sort_key,
                label,
                ord: SmallVec::new(),
            }
        }
        None => ComputedKey::plain(EMPTY_LABEL.to_string()),
    }
}

/// Legacy text grouping scans the buckets three times: literal values win
/// over conditions, conditions over the contains-keyword list.
fn compute_single_text(text: &str, bins: &[TextBin]) -> ComputedKey {
    if let Some(i) = bins
        .iter()
        .position(|bin| bin.exact_values.iter().any(|v| v.trim() == text))
    {
        return ComputedKey::single(bins[i].label.clone(), Some(i));
    }
    if let Some(i) = bins.iter().position(|bin| conditions_match(&bin.conditions, text)) {
        return ComputedKey::single(bins[i].label.clone(), Some(i));
    }
    if let Some(i) = bins.iter().position(|bin| {
        bin.keywords
            .iter()
            .any(|kw| !kw.is_empty() && text.contains(kw.as_str()))
    }) {
        return ComputedKey::single(bins[i].label.clone(), Some(i));
    }
    ComputedKey::single(UNGROUPED_LABEL.to_string(), Some(SENTINEL_RANK))
}

// ============================================================================
// GROUP ACCUMULATION AND ORDERING
// ============================================================================

struct GroupEntry {
    key: String,
    sort_key: Option<f64>,
    ord: Option<SmallVec<[LevelOrd; 4]>>,
    shortest_label: Option<String>,
    rows: Vec<Row>,
    media_count: usize,
}

/// Accumulates rows under their resolved keys, then orders the groups.
pub struct GroupAccumulator {
    descending: bool,
    index: rustc_hash::FxHashMap<String, usize>,
    entries: Vec<GroupEntry>,
}

impl GroupAccumulator {
    pub fn new(mode: &GroupingMode) -> Self {
        let descending = match mode {
            GroupingMode::Single(single) => single.descending,
            GroupingMode::Multi(levels) => {
                levels.first().map(|level| level.descending).unwrap_or(false)
            }
            GroupingMode::None => false,
        };
        GroupAccumulator {
            descending,
            index: rustc_hash::FxHashMap::default(),
            entries: Vec::new(),
        }
    }

    /// Add a row under its resolved key. Rows arrive already sorted, so the
    /// per-group row order is the flat view's order.
    pub fn push(&mut self, row: Row, key: ComputedKey, has_media: bool) {
        let ComputedKey {
            key,
            sort_key,
            label,
            ord,
        } = key;
        let ord = if ord.is_empty() { None } else { Some(ord) };

        let idx = match self.index.get(&key) {
            Some(idx) => *idx,
            None => {
                let idx = self.entries.len();
                self.index.insert(key.clone(), idx);
                self.entries.push(GroupEntry {
                    key,
                    sort_key: None,
                    ord: None,
                    shortest_label: None,
                    rows: Vec::new(),
                    media_count: 0,
                });
                idx
            }
        };

        let entry = &mut self.entries[idx];
        entry.rows.push(row);
        if has_media {
            entry.media_count += 1;
        }
        match (entry.sort_key, sort_key) {
            (None, Some(n)) => entry.sort_key = Some(n),
            (Some(a), Some(n)) if n < a => entry.sort_key = Some(n),
            _ => {}
        }
        if entry.ord.is_none() {
            entry.ord = ord;
        }
        if let Some(candidate) = label {
            let better = match &entry.shortest_label {
                Some(current) => candidate.len() < current.len(),
                None => true,
            };
            if better {
                entry.shortest_label = Some(candidate);
            }
        }
    }

    /// Order the groups and produce the renderable views.
    ///
    /// Numbered-text priorities win when any group carries one (honoring
    /// the group column's descending flag); otherwise bin declaration order
    /// when binning is active; otherwise natural string order.
    pub fn finish(mut self) -> Vec<GroupView> {
        let any_sort_key = self.entries.iter().any(|entry| entry.sort_key.is_some());
        let any_bins = self
            .entries
            .iter()
            .any(|entry| entry.ord.as_ref().is_some_and(|ord| ord.iter().any(|l| l.bin.is_some())));
        let descending = self.descending;

        if any_sort_key {
            self.entries.sort_by(|a, b| {
                let ord = match (a.sort_key, b.sort_key) {
                    (Some(x), Some(y)) => {
                        x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal)
                    }
                    // Groups without a priority order after those with one
                    (Some(_), None) => return std::cmp::Ordering::Less,
                    (None, Some(_)) => return std::cmp::Ordering::Greater,
                    (None, None) => natural_cmp(&a.key, &b.key),
                };
                let ord = ord.then_with(|| natural_cmp(&a.key, &b.key));
                if descending {
                    ord.reverse()
                } else {
                    ord
                }
            });
        } else if any_bins {
            self.entries.sort_by(|a, b| match (&a.ord, &b.ord) {
                (Some(pa), Some(pb)) => compare_ord_paths(pa, pb)
                    .then_with(|| natural_cmp(&a.key, &b.key)),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => natural_cmp(&a.key, &b.key),
            });
        } else {
            self.entries.sort_by(|a, b| {
                let ord = natural_cmp(&a.key, &b.key);
                if descending {
                    ord.reverse()
                } else {
                    ord
                }
            });
        }

        self.entries
            .into_iter()
            .map(|entry| {
                let label = entry.shortest_label.unwrap_or_else(|| entry.key.clone());
                GroupView {
                    key: entry.key,
                    label,
                    rows: entry.rows,
                    media_count: entry.media_count,
                }
            })
            .collect()
    }
}

/// Level-by-level comparison: bin rank first, natural text inside the same
/// rank; unbinned levels compare by text alone.
fn compare_ord_paths(a: &[LevelOrd], b: &[LevelOrd]) -> std::cmp::Ordering {
    for (la, lb) in a.iter().zip(b.iter()) {
        let ord = match (la.bin, lb.bin) {
            (Some(x), Some(y)) => x.cmp(&y).then_with(|| natural_cmp(&la.text, &lb.text)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => natural_cmp(&la.text, &lb.text),
        };
        if ord != std::cmp::Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}
