//! FILENAME: view-engine/src/definition.rs
//! PURPOSE: View Definition - The serializable configuration.
//!
//! This module contains all the types needed to DESCRIBE a row view.
//! These structures are designed to be:
//! - Serializable (the host owns persistence and ships them as JSON)
//! - Immutable snapshots of user intent
//!
//! The configuration carries both the canonical `group_levels` list and the
//! legacy single-column grouping fields. `ViewConfig::normalize` reconciles
//! the two shapes exactly once; the engines only ever see a `GroupingMode`.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

use crate::fuzzy::{self, FuzzyRule};

// ============================================================================
// FILTER RULES
// ============================================================================

/// All filter operators: the text family, the numeric family, and the
/// legacy multi-select mode (`InSet` with an explicit allow-set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Contains,
    NotContains,
    Equals,
    NotEquals,
    StartsWith,
    EndsWith,
    NotEmpty,
    IsEmpty,
    Regex,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    Between,
    InSet,
}

impl Default for FilterOperator {
    fn default() -> Self {
        FilterOperator::Contains
    }
}

/// One filter rule. Rules with an empty `column` are ignored; the full list
/// is AND-combined.
#[derive(Debug, Clone, PartialEq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FilterRule {
    pub column: String,
    #[serde(default)]
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: String,
    /// Second comparison value, used by `between`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value2: Option<String>,
    /// Allow-set for the legacy multi-select mode.
    #[serde(default)]
    pub values: Vec<String>,
}

/// Numeric-only operators for the dedicated numeric filter list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumericOperator {
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    Between,
    Equals,
    NotEquals,
}

/// A rule in the numeric-only filter list the configuration carries next to
/// the general one.
#[derive(Debug, Clone, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumFilterRule {
    pub column: String,
    pub operator: NumericOperator,
    #[serde(default)]
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value2: Option<String>,
}

// ============================================================================
// SORT RULES
// ============================================================================

/// One entry of the sort priority chain. Earlier rules win.
#[derive(Debug, Clone, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortRule {
    pub column: String,
    #[serde(default)]
    pub descending: bool,
}

// ============================================================================
// BINS
// ============================================================================

/// A labeled numeric range, inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericBinRange {
    pub label: String,
    pub min: f64,
    pub max: f64,
}

impl NumericBinRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Hash for NumericBinRange {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.label.hash(state);
        self.min.to_bits().hash(state);
        self.max.to_bits().hash(state);
    }
}

/// A labeled date range, inclusive through end-of-day on `end_date`.
#[derive(Debug, Clone, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateBinRange {
    pub label: String,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
}

impl DateBinRange {
    pub fn contains(&self, value: chrono::NaiveDateTime) -> bool {
        let day = value.date();
        day >= self.start_date && day <= self.end_date
    }
}

/// Operators usable inside a text-bin condition. The numeric ones compare
/// numbers extracted from the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextConditionOperator {
    Contains,
    Equals,
    StartsWith,
    EndsWith,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    NumEquals,
}

/// One condition of a text bin.
#[derive(Debug, Clone, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextCondition {
    pub operator: TextConditionOperator,
    pub value: String,
}

/// A labeled text bucket: literal values, ordered conditions, and the
/// legacy contains-keyword list (consulted only on the single-level path).
#[derive(Debug, Clone, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBin {
    pub label: String,
    #[serde(default)]
    pub exact_values: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<TextCondition>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

// ============================================================================
// GROUP LEVELS
// ============================================================================

/// The binning strategy of one group level.
#[derive(Debug, Clone, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum GroupLevelKind {
    Text {
        #[serde(default)]
        bins: Vec<TextBin>,
    },
    NumericBins {
        bins: Vec<NumericBinRange>,
    },
    DateBins {
        bins: Vec<DateBinRange>,
    },
}

impl Default for GroupLevelKind {
    fn default() -> Self {
        GroupLevelKind::Text { bins: Vec::new() }
    }
}

/// One tier of a multi-level grouping, ordered outer-to-inner (level 0 is
/// the outermost grouping).
#[derive(Debug, Clone, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupLevel {
    pub column: String,
    #[serde(default)]
    pub descending: bool,
    #[serde(flatten)]
    pub kind: GroupLevelKind,
}

impl GroupLevel {
    /// Whether this level carries explicit bins of any kind.
    pub fn has_bins(&self) -> bool {
        match &self.kind {
            GroupLevelKind::Text { bins } => !bins.is_empty(),
            GroupLevelKind::NumericBins { bins } => !bins.is_empty(),
            GroupLevelKind::DateBins { bins } => !bins.is_empty(),
        }
    }
}

// ============================================================================
// HIGHLIGHT RULES
// ============================================================================

/// Highlight operators: the filter families plus date windows and
/// link/media/formula detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HighlightOperator {
    Contains,
    NotContains,
    Equals,
    NotEquals,
    StartsWith,
    EndsWith,
    NotEmpty,
    IsEmpty,
    Regex,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    Between,
    DateEquals,
    DateBefore,
    DateAfter,
    Today,
    ThisWeek,
    ThisMonth,
    HasLink,
    HasImageLink,
    HasFormula,
}

/// One style rule. Rules are evaluated in list order; the first enabled
/// match wins.
#[derive(Debug, Clone, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightRule {
    pub column: String,
    pub operator: HighlightOperator,
    #[serde(default)]
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value2: Option<String>,
    /// CSS color applied to the matching row.
    pub color: String,
    /// Border width in pixels; defaults to 3 when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u8>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

// ============================================================================
// MAIN CONFIG STRUCT
// ============================================================================

/// The complete, serializable configuration of a row view.
/// This is the "source of truth" the host saves and restores.
#[derive(Debug, Clone, PartialEq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ViewConfig {
    /// General filter rules, AND-combined.
    #[serde(default)]
    pub filters: Vec<FilterRule>,

    /// Numeric-only filter rules, AND-combined with the general ones.
    #[serde(default)]
    pub num_filters: Vec<NumFilterRule>,

    /// Sort priority chain (earlier rules win).
    #[serde(default)]
    pub sorts: Vec<SortRule>,

    /// Canonical grouping configuration, ordered outer-to-inner.
    #[serde(default)]
    pub group_levels: Vec<GroupLevel>,

    /// Legacy single-column grouping fields. Kept for configurations saved
    /// by older hosts; folded into `GroupingMode` by `normalize`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_column: Option<String>,
    #[serde(default)]
    pub numeric_binning_enabled: bool,
    #[serde(default)]
    pub numeric_bins: Vec<NumericBinRange>,
    #[serde(default)]
    pub text_binning_enabled: bool,
    #[serde(default)]
    pub text_bins: Vec<TextBin>,
    /// Fuzzy merge-rule string, e.g. `"kw1,kw2=TargetA;kw3=TargetB"`.
    #[serde(default)]
    pub fuzzy_rules: String,
    #[serde(default)]
    pub group_descending: bool,

    /// Style rules, first enabled match wins.
    #[serde(default)]
    pub highlights: Vec<HighlightRule>,
}

impl ViewConfig {
    /// Content hash of the whole configuration, used by the memo cache.
    pub fn content_hash(&self) -> u64 {
        let mut hasher = rustc_hash::FxHasher::default();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

// ============================================================================
// NORMALIZED GROUPING MODE
// ============================================================================

/// Legacy single-column grouping, fully resolved: empty bin lists mean the
/// corresponding strategy is disabled, and the fuzzy string is already
/// parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleLevelGrouping {
    pub column: String,
    pub numeric_bins: Vec<NumericBinRange>,
    pub text_bins: Vec<TextBin>,
    pub fuzzy_rules: Vec<FuzzyRule>,
    pub descending: bool,
}

/// The one grouping shape the engines consume. Produced by
/// `ViewConfig::normalize`; the dual legacy/new config paths end here.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupingMode {
    /// No grouping configured; the view is the flat row list.
    None,
    Single(SingleLevelGrouping),
    Multi(Vec<GroupLevel>),
}

impl ViewConfig {
    /// Reconcile the legacy single-column fields and the `group_levels`
    /// list into one canonical `GroupingMode`. Called once at ingestion.
    ///
    /// More than one level, or a single level carrying explicit bins, is
    /// multi-level. A single bare level degrades to legacy single-column
    /// grouping on that level's column, picking up the legacy bin/fuzzy
    /// options.
    pub fn normalize(&self) -> GroupingMode {
        if !self.group_levels.is_empty() {
            let multi =
                self.group_levels.len() > 1 || self.group_levels.iter().any(GroupLevel::has_bins);
            if multi {
                return GroupingMode::Multi(self.group_levels.clone());
            }
            let level = &self.group_levels[0];
            return GroupingMode::Single(self.single_level(
                level.column.clone(),
                level.descending || self.group_descending,
            ));
        }

        match &self.group_column {
            Some(column) if !column.trim().is_empty() => {
                GroupingMode::Single(self.single_level(column.clone(), self.group_descending))
            }
            _ => GroupingMode::None,
        }
    }

    fn single_level(&self, column: String, descending: bool) -> SingleLevelGrouping {
        SingleLevelGrouping {
            column,
            numeric_bins: if self.numeric_binning_enabled {
                self.numeric_bins.clone()
            } else {
                Vec::new()
            },
            text_bins: if self.text_binning_enabled {
                self.text_bins.clone()
            } else {
                Vec::new()
            },
            fuzzy_rules: fuzzy::parse_rules_lenient(&self.fuzzy_rules),
            descending,
        }
    }
}
