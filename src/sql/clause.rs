//! Boolean where-tree and leaf predicates.

use super::SqlValue;

/// Comparison operator for integer predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerOp {
    Equals,
    NotEquals,
    Greater,
    Less,
    GreaterEquals,
    LessEquals,
}

impl IntegerOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            IntegerOp::Equals => "=",
            IntegerOp::NotEquals => "<>",
            IntegerOp::Greater => ">",
            IntegerOp::Less => "<",
            IntegerOp::GreaterEquals => ">=",
            IntegerOp::LessEquals => "<=",
        }
    }
}

/// Comparison operator for string predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringOp {
    Equals,
    NotEquals,
    Like,
    NotLike,
    Regexp,
    NotRegexp,
}

impl StringOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            StringOp::Equals => "=",
            StringOp::NotEquals => "<>",
            StringOp::Like => "LIKE",
            StringOp::NotLike => "NOT LIKE",
            StringOp::Regexp => "REGEXP",
            StringOp::NotRegexp => "NOT REGEXP",
        }
    }
}

/// A node in the boolean where-tree: AND/OR groups over leaf predicates.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereNode {
    And(Vec<WhereNode>),
    Or(Vec<WhereNode>),
    /// `column <op> ?` with an integer parameter.
    Integer {
        column: String,
        op: IntegerOp,
        value: i64,
    },
    /// `column <op> ?` with a text parameter.
    Text {
        column: String,
        op: StringOp,
        value: String,
    },
    /// `column [NOT] IN (?, ...)`.
    In {
        column: String,
        values: Vec<SqlValue>,
        negated: bool,
    },
    /// `column IS [NOT] NULL`. Used by join where-fragments.
    Null { column: String, negated: bool },
}

impl WhereNode {
    /// Render the subtree into `out`, pushing bind values onto `params`.
    pub fn render(&self, out: &mut String, params: &mut Vec<SqlValue>) {
        match self {
            WhereNode::And(children) => Self::render_group(children, " AND ", out, params),
            WhereNode::Or(children) => Self::render_group(children, " OR ", out, params),
            WhereNode::Integer { column, op, value } => {
                out.push_str(column);
                out.push(' ');
                out.push_str(op.as_sql());
                out.push_str(" ?");
                params.push(SqlValue::Integer(*value));
            }
            WhereNode::Text { column, op, value } => {
                out.push_str(column);
                out.push(' ');
                out.push_str(op.as_sql());
                out.push_str(" ?");
                params.push(SqlValue::Text(value.clone()));
            }
            WhereNode::In {
                column,
                values,
                negated,
            } => {
                out.push_str(column);
                out.push_str(if *negated { " NOT IN (" } else { " IN (" });
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push('?');
                    params.push(value.clone());
                }
                out.push(')');
            }
            WhereNode::Null { column, negated } => {
                out.push_str(column);
                out.push_str(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
        }
    }

    fn render_group(
        children: &[WhereNode],
        separator: &str,
        out: &mut String,
        params: &mut Vec<SqlValue>,
    ) {
        match children {
            [] => out.push_str("1=1"),
            [only] => only.render(out, params),
            many => {
                out.push('(');
                for (i, child) in many.iter().enumerate() {
                    if i > 0 {
                        out.push_str(separator);
                    }
                    child.render(out, params);
                }
                out.push(')');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(node: &WhereNode) -> (String, Vec<SqlValue>) {
        let mut text = String::new();
        let mut params = Vec::new();
        node.render(&mut text, &mut params);
        (text, params)
    }

    #[test]
    fn test_integer_leaf() {
        let node = WhereNode::Integer {
            column: "views".into(),
            op: IntegerOp::GreaterEquals,
            value: 10,
        };
        let (text, params) = render(&node);
        assert_eq!(text, "views >= ?");
        assert_eq!(params, vec![SqlValue::Integer(10)]);
    }

    #[test]
    fn test_and_group_parenthesized() {
        let node = WhereNode::And(vec![
            WhereNode::Integer {
                column: "views".into(),
                op: IntegerOp::GreaterEquals,
                value: 10,
            },
            WhereNode::Integer {
                column: "views".into(),
                op: IntegerOp::LessEquals,
                value: 50,
            },
        ]);
        let (text, params) = render(&node);
        assert_eq!(text, "(views >= ? AND views <= ?)");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_single_child_group_unwrapped() {
        let node = WhereNode::Or(vec![WhereNode::Null {
            column: "users.id".into(),
            negated: false,
        }]);
        let (text, params) = render(&node);
        assert_eq!(text, "users.id IS NULL");
        assert!(params.is_empty());
    }

    #[test]
    fn test_in_list_placeholders() {
        let node = WhereNode::In {
            column: "post_status".into(),
            values: vec![
                SqlValue::Text("publish".into()),
                SqlValue::Text("draft".into()),
            ],
            negated: true,
        };
        let (text, params) = render(&node);
        assert_eq!(text, "post_status NOT IN (?, ?)");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_nested_tree() {
        let node = WhereNode::Or(vec![
            WhereNode::And(vec![
                WhereNode::Text {
                    column: "meta_key".into(),
                    op: StringOp::Equals,
                    value: "views".into(),
                },
                WhereNode::Integer {
                    column: "meta_value".into(),
                    op: IntegerOp::Greater,
                    value: 100,
                },
            ]),
            WhereNode::Null {
                column: "posts.id".into(),
                negated: true,
            },
        ]);
        let (text, params) = render(&node);
        assert_eq!(
            text,
            "((meta_key = ? AND meta_value > ?) OR posts.id IS NOT NULL)"
        );
        assert_eq!(
            params,
            vec![SqlValue::Text("views".into()), SqlValue::Integer(100)]
        );
    }

    #[test]
    fn test_text_value_becomes_parameter() {
        // A hostile value must never appear in the rendered text.
        let node = WhereNode::Text {
            column: "post_title".into(),
            op: StringOp::Like,
            value: "%'; DROP TABLE posts; --%".into(),
        };
        let (text, params) = render(&node);
        assert_eq!(text, "post_title LIKE ?");
        assert!(!text.contains("DROP"));
        assert_eq!(params.len(), 1);
    }
}
