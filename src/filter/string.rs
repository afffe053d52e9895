//! Text column filter.
//!
//! Matching is case-insensitive unless the `case` flag is set. The `regex`
//! flag treats the value as a regular expression and is honored for
//! contains/notcontains logic; other logic kinds always match literally.
//! Replacement arithmetic (including regex captures) lives here — the other
//! variants replace whole values only.

use super::{Action, ColumnMatch, MatchSpan, RawFilter};
use crate::schema::{SchemaColumn, SchemaSource};
use crate::sql::{escape_like, Query, StringOp, WhereNode};
use regex::{NoExpand, Regex, RegexBuilder};

/// Closed logic set for string filters. Unrecognized input falls back to
/// `Contains`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringLogic {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    Begins,
    Ends,
}

impl StringLogic {
    fn parse(raw: &str) -> StringLogic {
        match raw.to_lowercase().as_str() {
            "equals" => StringLogic::Equals,
            "notequals" => StringLogic::NotEquals,
            "contains" => StringLogic::Contains,
            "notcontains" => StringLogic::NotContains,
            "begins" => StringLogic::Begins,
            "ends" => StringLogic::Ends,
            _ => StringLogic::Contains,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            StringLogic::Equals => "equals",
            StringLogic::NotEquals => "notequals",
            StringLogic::Contains => "contains",
            StringLogic::NotContains => "notcontains",
            StringLogic::Begins => "begins",
            StringLogic::Ends => "ends",
        }
    }

    fn negated(&self) -> bool {
        matches!(self, StringLogic::NotEquals | StringLogic::NotContains)
    }
}

/// Filter for a text column. Immutable after construction; the matcher is
/// compiled once and reused for every row evaluation.
#[derive(Debug, Clone)]
pub struct StringFilter {
    column: String,
    source: String,
    value: String,
    logic: StringLogic,
    case_sensitive: bool,
    is_regex: bool,
    matcher: Option<Regex>,
    has_value: bool,
}

impl StringFilter {
    pub fn new(raw: &RawFilter, column: &SchemaColumn, source: &SchemaSource) -> Self {
        let logic = raw
            .logic
            .as_deref()
            .map(StringLogic::parse)
            .unwrap_or(StringLogic::Contains);
        let case_sensitive = raw.flags.iter().any(|f| f == "case");
        // Regex patterns only make sense for containment logic; anything else
        // matches literally.
        let is_regex = raw.flags.iter().any(|f| f == "regex")
            && matches!(logic, StringLogic::Contains | StringLogic::NotContains);

        let value = raw.value.clone().filter(|v| !v.is_empty());
        let (value, matcher, has_value) = match value {
            Some(value) => {
                match Self::build_matcher(&value, logic, case_sensitive, is_regex) {
                    Some(matcher) => (value, Some(matcher), true),
                    // An uncompilable regex degrades the filter to invalid.
                    None => (value, None, false),
                }
            }
            None => (String::new(), None, false),
        };

        Self {
            column: column.column.clone(),
            source: source.source.clone(),
            value,
            logic,
            case_sensitive,
            is_regex,
            matcher,
            has_value,
        }
    }

    fn build_matcher(
        value: &str,
        logic: StringLogic,
        case_sensitive: bool,
        is_regex: bool,
    ) -> Option<Regex> {
        let base = if is_regex {
            value.to_string()
        } else {
            regex::escape(value)
        };
        let pattern = match logic {
            StringLogic::Equals | StringLogic::NotEquals => format!("^(?:{})$", base),
            StringLogic::Begins => format!("^(?:{})", base),
            StringLogic::Ends => format!("(?:{})$", base),
            StringLogic::Contains | StringLogic::NotContains => base,
        };
        RegexBuilder::new(&pattern)
            .case_insensitive(!case_sensitive)
            .build()
            .ok()
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
            let (op, value) = match self.logic {
                StringLogic::Equals => (StringOp::Equals, self.value.clone()),
                StringLogic::NotEquals => (StringOp::NotEquals, self.value.clone()),
                StringLogic::Contains if self.is_regex => (StringOp::Regexp, self.value.clone()),
                StringLogic::NotContains if self.is_regex => {
                    (StringOp::NotRegexp, self.value.clone())
                }
                StringLogic::Contains => {
                    (StringOp::Like, format!("%{}%", escape_like(&self.value)))
                }
                StringLogic::NotContains => {
                    (StringOp::NotLike, format!("%{}%", escape_like(&self.value)))
                }
                StringLogic::Begins => (StringOp::Like, format!("{}%", escape_like(&self.value))),
                StringLogic::Ends => (StringOp::Like, format!("%{}", escape_like(&self.value))),
            };
            query.add_where(WhereNode::Text {
                column: self.column.clone(),
                op,
                value,
            });
        }

        query
    }

    pub fn evaluate(&self, raw_value: &str, action: &Action) -> ColumnMatch {
        let value = raw_value.to_string();

        let Some(matcher) = self.matcher.as_ref().filter(|_| self.has_value) else {
            return ColumnMatch::unmatched(value);
        };

        if self.logic.negated() {
            if matcher.is_match(raw_value) {
                return ColumnMatch::unmatched(value);
            }
            // Matched by absence: no sub-span and nothing to substitute.
            return ColumnMatch::matched(value, Vec::new(), None);
        }

        let spans: Vec<MatchSpan> = matcher
            .find_iter(raw_value)
            .map(|m| MatchSpan {
                start: m.start(),
                end: m.end(),
            })
            .collect();
        if spans.is_empty() {
            return ColumnMatch::unmatched(value);
        }

        let replacement = match action {
            Action::Replace(with) if self.is_regex => {
                Some(matcher.replace_all(raw_value, with.as_str()).into_owned())
            }
            Action::Replace(with) => Some(
                matcher
                    .replace_all(raw_value, NoExpand(with))
                    .into_owned(),
            ),
            Action::Search => None,
        };

        ColumnMatch::matched(value, spans, replacement)
    }

    pub fn to_raw(&self) -> RawFilter {
        let mut flags = Vec::new();
        if self.case_sensitive {
            flags.push("case".to_string());
        }
        if self.is_regex {
            flags.push("regex".to_string());
        }
        RawFilter {
            column: self.column.clone(),
            logic: Some(self.logic.as_str().to_string()),
            value: Some(self.value.clone()),
            flags,
            ..Default::default()
        }
    }
}
