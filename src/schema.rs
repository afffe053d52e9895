//! Static schema descriptions for searchable sources.
//!
//! A source is a logical table (posts, comments, a meta table, ...) described
//! by a `SchemaSource`: its table name, title column, and a fixed ordered set
//! of typed columns. Schemas are built once from static definitions and never
//! mutated, so they are safe to share across threads without synchronization.

use serde::{Deserialize, Serialize};

/// Semantic type of a column. Drives which filter variant is constructed
/// for criteria targeting the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Numeric column, filtered with comparison/range logic.
    Integer,
    /// Text column, filtered with contains/equals/regex logic.
    String,
    /// Membership column: a closed value set, or existence in a joined table.
    Member,
}

/// A single typed column of a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaColumn {
    /// Column name as it appears in the table.
    pub column: String,
    /// Semantic type.
    #[serde(rename = "type")]
    pub kind: ColumnKind,
    /// Human-readable title for pickers.
    pub title: String,
    /// Relation name used to resolve a join for membership logic
    /// (e.g. `"post"` for a column holding post IDs).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joined_by: Option<String>,
}

impl SchemaColumn {
    pub fn new(column: &str, kind: ColumnKind, title: &str) -> Self {
        Self {
            column: column.to_string(),
            kind,
            title: title.to_string(),
            joined_by: None,
        }
    }

    /// Mark the column as joinable through the given relation name.
    pub fn joined_by(mut self, relation: &str) -> Self {
        self.joined_by = Some(relation.to_string());
        self
    }
}

/// Schema for one logical source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaSource {
    /// Logical source name (e.g. `"posts"`, `"comment-meta"`).
    pub source: String,
    /// Underlying table name.
    pub table: String,
    /// Column used as the row title in result listings.
    pub title_column: String,
    /// Ordered column definitions.
    pub columns: Vec<SchemaColumn>,
}

impl SchemaSource {
    pub fn new(source: &str, table: &str, title_column: &str, columns: Vec<SchemaColumn>) -> Self {
        Self {
            source: source.to_string(),
            table: table.to_string(),
            title_column: title_column.to_string(),
            columns,
        }
    }

    /// Look up a column definition by name.
    pub fn column(&self, name: &str) -> Option<&SchemaColumn> {
        self.columns.iter().find(|c| c.column == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SchemaSource {
        SchemaSource::new(
            "posts",
            "posts",
            "post_title",
            vec![
                SchemaColumn::new("id", ColumnKind::Integer, "ID"),
                SchemaColumn::new("post_author", ColumnKind::Integer, "Author").joined_by("user"),
                SchemaColumn::new("post_title", ColumnKind::String, "Title"),
            ],
        )
    }

    #[test]
    fn test_column_lookup() {
        let schema = sample();
        assert!(schema.column("post_title").is_some());
        assert!(schema.column("missing").is_none());
        assert_eq!(
            schema.column("post_author").unwrap().joined_by.as_deref(),
            Some("user")
        );
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&ColumnKind::Member).unwrap();
        assert_eq!(json, "\"member\"");
        let kind: ColumnKind = serde_json::from_str("\"integer\"").unwrap();
        assert_eq!(kind, ColumnKind::Integer);
    }

    #[test]
    fn test_schema_serializes_type_field() {
        let schema = sample();
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["columns"][0]["type"], "integer");
        // joined_by omitted when absent
        assert!(json["columns"][0].get("joined_by").is_none());
        assert_eq!(json["columns"][1]["joined_by"], "user");
    }
}
