//! Numeric column filter.

use super::{coerce_int, Action, ColumnMatch, MatchSpan, RawFilter};
use crate::schema::{SchemaColumn, SchemaSource};
use crate::sql::{Inclusion, IntegerOp, Join, Query, WhereNode};

/// Closed logic set for integer filters. Unrecognized input falls back to
/// `Equals` rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerLogic {
    Equals,
    NotEquals,
    Greater,
    Less,
    Range,
    NotRange,
    Has,
    HasNot,
}

impl IntegerLogic {
    fn parse(raw: &str) -> IntegerLogic {
        match raw.to_lowercase().as_str() {
            "equals" => IntegerLogic::Equals,
            "notequals" => IntegerLogic::NotEquals,
            "greater" => IntegerLogic::Greater,
            "less" => IntegerLogic::Less,
            "range" => IntegerLogic::Range,
            "notrange" => IntegerLogic::NotRange,
            "has" => IntegerLogic::Has,
            "hasnot" => IntegerLogic::HasNot,
            _ => IntegerLogic::Equals,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            IntegerLogic::Equals => "equals",
            IntegerLogic::NotEquals => "notequals",
            IntegerLogic::Greater => "greater",
            IntegerLogic::Less => "less",
            IntegerLogic::Range => "range",
            IntegerLogic::NotRange => "notrange",
            IntegerLogic::Has => "has",
            IntegerLogic::HasNot => "hasnot",
        }
    }

    fn comparison_op(&self) -> Option<IntegerOp> {
        match self {
            IntegerLogic::Equals => Some(IntegerOp::Equals),
            IntegerLogic::NotEquals => Some(IntegerOp::NotEquals),
            IntegerLogic::Greater => Some(IntegerOp::Greater),
            IntegerLogic::Less => Some(IntegerOp::Less),
            _ => None,
        }
    }
}

/// Filter for a numeric column: comparisons, ranges, or membership via a
/// resolved join. Immutable after construction.
#[derive(Debug, Clone)]
pub struct IntegerFilter {
    column: String,
    source: String,
    start_value: i64,
    end_value: i64,
    logic: IntegerLogic,
    has_value: bool,
    join: Option<Join>,
}

impl IntegerFilter {
    pub fn new(raw: &RawFilter, column: &SchemaColumn, source: &SchemaSource) -> Self {
        let logic = raw
            .logic
            .as_deref()
            .map(IntegerLogic::parse)
            .unwrap_or(IntegerLogic::Equals);

        let mut start_value = 0;
        let mut end_value = 0;
        let mut has_value = false;

        if let Some(start) = raw.start_value.as_deref().filter(|s| !s.is_empty()) {
            start_value = coerce_int(start);
            has_value = true;
        }
        if let Some(end) = raw.end_value.as_deref().filter(|s| !s.is_empty()) {
            // End of a range can never precede its start.
            end_value = coerce_int(end).max(start_value);
            has_value = true;
        }

        let mut join = None;
        if matches!(logic, IntegerLogic::Has | IntegerLogic::HasNot) {
            let inclusion = if logic == IntegerLogic::Has {
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
            start_value,
            end_value,
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

    pub fn start_value(&self) -> i64 {
        self.start_value
    }

    pub fn end_value(&self) -> i64 {
        self.end_value
    }

    pub fn query_contribution(&self) -> Query {
        let mut query = Query::new();
        query.add_select(&self.column);

        if self.is_valid() {
            let predicate = match self.logic {
                IntegerLogic::Range => Some(WhereNode::And(vec![
                    WhereNode::Integer {
                        column: self.column.clone(),
                        op: IntegerOp::GreaterEquals,
                        value: self.start_value,
                    },
                    WhereNode::Integer {
                        column: self.column.clone(),
                        op: IntegerOp::LessEquals,
                        value: self.end_value,
                    },
                ])),
                IntegerLogic::NotRange => Some(WhereNode::Or(vec![
                    WhereNode::Integer {
                        column: self.column.clone(),
                        op: IntegerOp::LessEquals,
                        value: self.start_value,
                    },
                    WhereNode::Integer {
                        column: self.column.clone(),
                        op: IntegerOp::GreaterEquals,
                        value: self.end_value,
                    },
                ])),
                IntegerLogic::Has | IntegerLogic::HasNot => None,
                other => other.comparison_op().map(|op| WhereNode::Integer {
                    column: self.column.clone(),
                    op,
                    value: self.start_value,
                }),
            };

            // A join always wins over a plain predicate.
            if let Some(join) = &self.join {
                query.add_join(join.clone());
            } else if let Some(predicate) = predicate {
                query.add_where(predicate);
            }
        }

        query
    }

    pub fn evaluate(&self, raw_value: &str, action: &Action) -> ColumnMatch {
        let value = coerce_int(raw_value);
        let text = value.to_string();

        if self.has_value {
            let matched = match self.logic {
                IntegerLogic::Equals => value == self.start_value,
                IntegerLogic::NotEquals => value != self.start_value,
                IntegerLogic::Greater => value > self.start_value,
                IntegerLogic::Less => value < self.start_value,
                IntegerLogic::Range => value >= self.start_value && value <= self.end_value,
                IntegerLogic::NotRange => value <= self.start_value || value >= self.end_value,
                // Row existence was already guaranteed by the query's join;
                // re-checking here would be redundant.
                IntegerLogic::Has | IntegerLogic::HasNot => true,
            };

            if matched {
                let span = MatchSpan {
                    start: 0,
                    end: text.len(),
                };
                let replacement = match action {
                    Action::Replace(with) => Some(with.clone()),
                    Action::Search => None,
                };
                return ColumnMatch::matched(text, vec![span], replacement);
            }
        }

        ColumnMatch::unmatched(text)
    }

    pub fn to_raw(&self) -> RawFilter {
        RawFilter {
            column: self.column.clone(),
            logic: Some(self.logic.as_str().to_string()),
            start_value: Some(self.start_value.to_string()),
            end_value: Some(self.end_value.to_string()),
            ..Default::default()
        }
    }
}
