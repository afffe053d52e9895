//! Membership column filter.
//!
//! Two shapes of membership: a closed value set tested with IN/NOT IN, or —
//! for columns with a `joined_by` relation — row existence in the joined
//! table. Join-backed filters never carry start/end values and delegate
//! "matched" back to the query layer.

use super::{Action, ColumnMatch, MatchSpan, RawFilter};
use crate::schema::{SchemaColumn, SchemaSource};
use crate::sql::{Inclusion, Join, Query, SqlValue, WhereNode};

/// Closed logic set for member filters. Unrecognized input falls back to
/// `Include`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberLogic {
    /// Value must be in the set.
    Include,
    /// Value must not be in the set.
    Exclude,
    /// A joined row must exist.
    Has,
    /// No joined row may exist.
    HasNot,
}

impl MemberLogic {
    fn parse(raw: &str) -> MemberLogic {
        match raw.to_lowercase().as_str() {
            "include" => MemberLogic::Include,
            "exclude" => MemberLogic::Exclude,
            "has" => MemberLogic::Has,
            "hasnot" => MemberLogic::HasNot,
            _ => MemberLogic::Include,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            MemberLogic::Include => "include",
            MemberLogic::Exclude => "exclude",
            MemberLogic::Has => "has",
            MemberLogic::HasNot => "hasnot",
        }
    }
}

/// Filter for a membership column. Immutable after construction; owns the
/// join it resolves.
#[derive(Debug, Clone)]
pub struct MemberFilter {
    column: String,
    source: String,
    values: Vec<String>,
    logic: MemberLogic,
    has_value: bool,
    join: Option<Join>,
}

impl MemberFilter {
    pub fn new(raw: &RawFilter, column: &SchemaColumn, source: &SchemaSource) -> Self {
        let logic = raw
            .logic
            .as_deref()
            .map(MemberLogic::parse)
            .unwrap_or(MemberLogic::Include);

        let values: Vec<String> = raw.values.iter().filter(|v| !v.is_empty()).cloned().collect();
        let mut has_value = !values.is_empty();

        let mut join = None;
        if matches!(logic, MemberLogic::Has | MemberLogic::HasNot) {
            has_value = false;
            let inclusion = if logic == MemberLogic::Has {
                Inclusion::Has
            } else {
                Inclusion::HasNot
            };
            if let Some(relation) = column.joined_by.as_deref() {
                if let Some(resolved) =
                    Join::resolve(relation, inclusion, &source.table, &column.column)
                {
                    if resolved.kind().is_member_target() {
                        join = Some(resolved);
                        has_value = true;
                    }
                }
            }
        }

        Self {
            column: column.column.clone(),
            source: source.source.clone(),
            values,
            logic,
            has_value,
            join,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_valid(&self) -> bool {
        self.has_value
    }

    pub fn query_contribution(&self) -> Query {
        let mut query = Query::new();
        query.add_select(&self.column);

        if self.is_valid() {
            if let Some(join) = &self.join {
                query.add_join(join.clone());
            } else {
                query.add_where(WhereNode::In {
                    column: self.column.clone(),
                    values: self
                        .values
                        .iter()
                        .map(|v| SqlValue::Text(v.clone()))
                        .collect(),
                    negated: self.logic == MemberLogic::Exclude,
                });
            }
        }

        query
    }

    pub fn evaluate(&self, raw_value: &str, action: &Action) -> ColumnMatch {
        let value = raw_value.to_string();

        if self.has_value {
            let matched = match self.logic {
                // Row existence was already guaranteed by the query's join.
                MemberLogic::Has | MemberLogic::HasNot => true,
                MemberLogic::Include => self.values.iter().any(|v| v == raw_value),
                MemberLogic::Exclude => !self.values.iter().any(|v| v == raw_value),
            };

            if matched {
                let span = MatchSpan {
                    start: 0,
                    end: value.len(),
                };
                let replacement = match (action, self.logic) {
                    (Action::Replace(with), MemberLogic::Include) => Some(with.clone()),
                    _ => None,
                };
                return ColumnMatch::matched(value, vec![span], replacement);
            }
        }

        ColumnMatch::unmatched(value)
    }

    pub fn to_raw(&self) -> RawFilter {
        RawFilter {
            column: self.column.clone(),
            logic: Some(self.logic.as_str().to_string()),
            values: self.values.clone(),
            ..Default::default()
        }
    }
}
