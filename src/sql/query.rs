//! The query builder: selected columns, joins, and a boolean where-tree.

use super::clause::WhereNode;
use super::join::Join;
use super::SqlValue;

/// Rendered query: placeholder text plus the ordered bind parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Sql {
    pub text: String,
    pub params: Vec<SqlValue>,
}

/// Algebraic representation of a SELECT, assembled from per-filter
/// contributions and rendered once per compile pass.
///
/// Top-level where contributions are ANDed together. A filter that carries a
/// join routes its logic through the join's where-fragment (folded in by
/// [`Query::apply_join_wheres`]), never a plain column predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    selects: Vec<String>,
    joins: Vec<Join>,
    wheres: Vec<WhereNode>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a selected column, keeping first-seen order and dropping duplicates.
    pub fn add_select(&mut self, column: &str) {
        if !self.selects.iter().any(|c| c == column) {
            self.selects.push(column.to_string());
        }
    }

    /// Add a where contribution to the top-level AND group.
    pub fn add_where(&mut self, node: WhereNode) {
        self.wheres.push(node);
    }

    /// Attach a join, deduplicated by target table.
    pub fn add_join(&mut self, join: Join) {
        if !self.joins.iter().any(|j| j.target() == join.target()) {
            self.joins.push(join);
        }
    }

    /// Merge another query's contributions into this one.
    pub fn merge(&mut self, other: Query) {
        for column in other.selects {
            self.add_select(&column);
        }
        for join in other.joins {
            self.add_join(join);
        }
        self.wheres.extend(other.wheres);
    }

    /// Fold each join's required where-fragment into the tree. Called once,
    /// after all filter contributions are merged.
    pub fn apply_join_wheres(&mut self) {
        let fragments: Vec<WhereNode> = self.joins.iter().map(Join::where_fragment).collect();
        self.wheres.extend(fragments);
    }

    pub fn selects(&self) -> &[String] {
        &self.selects
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn wheres(&self) -> &[WhereNode] {
        &self.wheres
    }

    /// Render to placeholder SQL text plus ordered parameters.
    pub fn render(&self, table: &str) -> Sql {
        let mut text = String::from("SELECT ");
        if self.selects.is_empty() {
            text.push('*');
        } else {
            text.push_str(&self.selects.join(", "));
        }
        text.push_str(" FROM ");
        text.push_str(table);

        for join in &self.joins {
            text.push(' ');
            text.push_str(&join.join_clause());
        }

        let mut params = Vec::new();
        if !self.wheres.is_empty() {
            text.push_str(" WHERE ");
            WhereNode::And(self.wheres.clone()).render(&mut text, &mut params);
        }

        Sql { text, params }
    }
}
