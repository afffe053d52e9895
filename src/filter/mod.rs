//! Filter variants and the row evaluator.
//!
//! A filter is one user-specified matching criterion against one column. Each
//! variant exposes the same capability set: a query contribution for the
//! storage layer, an in-memory evaluator for fetched values, and a stable
//! structured form for transport. The two matching paths must agree — a value
//! the compiled predicate would select is exactly a value the evaluator
//! classifies as matched (membership joins delegate matching back to the
//! query layer, since SQL already guaranteed it).

pub mod integer;
pub mod member;
pub mod string;

pub use integer::IntegerFilter;
pub use member::MemberFilter;
pub use string::StringFilter;

use crate::schema::{ColumnKind, SchemaColumn, SchemaSource};
use crate::sql::Query;
use serde::{Deserialize, Serialize};

/// Wire form of a single filter criterion. Stable contract with the UI layer:
/// unknown or missing fields default, never error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawFilter {
    /// Target column name.
    pub column: String,
    /// Logic kind; variant-specific closed set, case-normalized on parse.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logic: Option<String>,
    /// Integer variant: start of range, or the single comparison value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_value: Option<String>,
    /// Integer variant: end of range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_value: Option<String>,
    /// String variant: pattern or literal value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Member variant: the value set.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    /// String variant flags: `"case"` (case-sensitive), `"regex"`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
}

/// What the caller intends to do with matched rows.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Search,
    /// Replace matched content with the given text.
    Replace(String),
}

/// A matched region of a column value, in byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
}

/// Row-evaluator output for one column: the classification plus enough
/// context to render a highlighted view and preview a replacement.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMatch {
    pub matched: bool,
    /// The (normalized) column value the classification applies to.
    pub value: String,
    /// Matched regions within `value`; empty when the whole value matched
    /// without a meaningful sub-span.
    pub spans: Vec<MatchSpan>,
    /// For replace actions: the value that would be written.
    pub replacement: Option<String>,
}

impl ColumnMatch {
    pub fn matched(value: String, spans: Vec<MatchSpan>, replacement: Option<String>) -> Self {
        Self {
            matched: true,
            value,
            spans,
            replacement,
        }
    }

    pub fn unmatched(value: String) -> Self {
        Self {
            matched: false,
            value,
            spans: Vec::new(),
            replacement: None,
        }
    }
}

/// A constructed filter. Closed variant set, dispatched on the target
/// column's kind at construction.
#[derive(Debug, Clone)]
pub enum FilterItem {
    Integer(IntegerFilter),
    Text(StringFilter),
    Member(MemberFilter),
}

impl FilterItem {
    /// Build a filter from its wire form against a schema column. Returns
    /// `None` only if no variant exists for the column kind (currently the
    /// set is total, but callers must treat `None` as skip-this-item).
    pub fn create(
        raw: &RawFilter,
        column: &SchemaColumn,
        source: &SchemaSource,
    ) -> Option<FilterItem> {
        match column.kind {
            ColumnKind::Integer => {
                Some(FilterItem::Integer(IntegerFilter::new(raw, column, source)))
            }
            ColumnKind::String => Some(FilterItem::Text(StringFilter::new(raw, column, source))),
            ColumnKind::Member => Some(FilterItem::Member(MemberFilter::new(raw, column, source))),
        }
    }

    /// Target column name.
    pub fn column(&self) -> &str {
        match self {
            FilterItem::Integer(f) => f.column(),
            FilterItem::Text(f) => f.column(),
            FilterItem::Member(f) => f.column(),
        }
    }

    /// Does this filter target a column of the named source?
    pub fn is_for_source(&self, source: &str) -> bool {
        let own = match self {
            FilterItem::Integer(f) => f.source(),
            FilterItem::Text(f) => f.source(),
            FilterItem::Member(f) => f.source(),
        };
        own == source
    }

    /// The sole gate for contributing a predicate: an invalid filter adds no
    /// where clause and always evaluates unmatched.
    pub fn is_valid(&self) -> bool {
        match self {
            FilterItem::Integer(f) => f.is_valid(),
            FilterItem::Text(f) => f.is_valid(),
            FilterItem::Member(f) => f.is_valid(),
        }
    }

    /// This filter's contribution to the source query: its selected column,
    /// plus a predicate or a join when valid.
    pub fn query_contribution(&self) -> Query {
        match self {
            FilterItem::Integer(f) => f.query_contribution(),
            FilterItem::Text(f) => f.query_contribution(),
            FilterItem::Member(f) => f.query_contribution(),
        }
    }

    /// Classify an already-fetched column value against the same logic the
    /// compiled predicate expresses.
    pub fn evaluate(&self, raw_value: &str, action: &Action) -> ColumnMatch {
        match self {
            FilterItem::Integer(f) => f.evaluate(raw_value, action),
            FilterItem::Text(f) => f.evaluate(raw_value, action),
            FilterItem::Member(f) => f.evaluate(raw_value, action),
        }
    }

    /// Canonical structured form; round-trips through [`FilterItem::create`].
    pub fn to_raw(&self) -> RawFilter {
        match self {
            FilterItem::Integer(f) => f.to_raw(),
            FilterItem::Text(f) => f.to_raw(),
            FilterItem::Member(f) => f.to_raw(),
        }
    }
}

/// Row evaluator entry point: ask the responsible filter whether a fetched
/// column value matches. A filter targeting a different column reports the
/// value unmatched.
pub fn evaluate_column(
    filter: &FilterItem,
    column: &str,
    raw_value: &str,
    action: &Action,
) -> ColumnMatch {
    if filter.column() == column {
        filter.evaluate(raw_value, action)
    } else {
        ColumnMatch::unmatched(raw_value.to_string())
    }
}

/// Permissive integer coercion, matching the behavior existing callers rely
/// on: leading sign and digits parse, a malformed tail is dropped, and a
/// fully malformed value coerces to 0.
pub(crate) fn coerce_int(raw: &str) -> i64 {
    let s = raw.trim();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'-') | Some(b'+')) {
        end = 1;
    }
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    s[..end].parse().unwrap_or(0)
}
