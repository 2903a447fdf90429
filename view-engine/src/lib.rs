//! FILENAME: view-engine/src/lib.rs
//! Row View subsystem.
//!
//! This crate provides the row transformation engine as a standalone
//! module, separate from the core value engine. It depends on `engine`
//! only for shared types (CellValue, Row) and the heuristic parsers.
//!
//! Layers:
//! - `definition`: Serializable configuration (what the view IS)
//! - `filter` / `sort` / `group` / `highlight`: the calculation engines
//! - `overlay`: manual classification overrides (decorator over `group`)
//! - `view`: Renderable output for the frontend (WHAT we display)
//! - `engine`: Orchestration and memoization (HOW we calculate)

pub mod definition;
pub mod engine;
pub mod filter;
pub mod fuzzy;
pub mod group;
pub mod highlight;
pub mod overlay;
pub mod sort;
pub mod view;

pub use definition::{
    DateBinRange, FilterOperator, FilterRule, GroupLevel, GroupLevelKind, GroupingMode,
    HighlightOperator, HighlightRule, NumFilterRule, NumericBinRange, NumericOperator,
    SingleLevelGrouping, SortRule, TextBin, TextCondition, TextConditionOperator, ViewConfig,
};
pub use engine::{calculate_view, column_unique_values, ViewCache};
pub use filter::apply_filters;
pub use fuzzy::{parse_rules, parse_rules_lenient, FuzzyRule, FuzzyRuleError};
pub use group::{
    compute_key, ComputedKey, GroupAccumulator, EMPTY_LABEL, INVALID_DATE_LABEL, LEVEL_SEPARATOR,
    OTHER_DATE_LABEL, OTHER_LABEL, UNGROUPED_LABEL,
};
pub use highlight::{evaluate, evaluate_today, HighlightStyle};
pub use overlay::{ClassificationOverlay, ClassificationOverrides, MediaRefExtractor, NoMedia};
pub use sort::{sort_rows, sorted};
pub use view::{GroupView, GroupedView, UniqueValue, UniqueValuesSummary};
