//! Composable, injection-safe SQL generation.
//!
//! Filters never concatenate user input into SQL text. Every user-supplied
//! value becomes a [`SqlValue`] bind parameter, and the rendered [`Sql`] pairs
//! placeholder text with the ordered parameter list. Column and table names
//! come from static schema definitions, not from the request.

pub mod clause;
pub mod join;
pub mod query;

pub use clause::{IntegerOp, StringOp, WhereNode};
pub use join::{Inclusion, Join, JoinKind};
pub use query::{Query, Sql};

use std::fmt;

/// A typed bind parameter. The only way request data enters a query.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Integer(i64),
    Text(String),
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Integer(v) => write!(f, "{}", v),
            SqlValue::Text(v) => write!(f, "{:?}", v),
        }
    }
}

/// Escape LIKE wildcards in a literal value so it matches itself.
pub fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch == '\\' || ch == '%' || ch == '_' {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }
}
