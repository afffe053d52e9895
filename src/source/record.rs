//! Generic schema-driven handler for plain record tables, plus the built-in
//! schema definitions for the core and advanced (non-meta) sources.

use super::handler::{distinct_values, PreloadValue, QueryExecutor, SourceHandler};
use crate::filter::FilterItem;
use crate::schema::{ColumnKind, SchemaColumn, SchemaSource};

/// Handler for a source whose rows live in a single table described entirely
/// by its schema.
#[derive(Debug)]
pub struct RecordSource {
    schema: SchemaSource,
    id_column: String,
    filters: Vec<FilterItem>,
}

impl RecordSource {
    pub fn new(schema: SchemaSource, id_column: &str, filters: Vec<FilterItem>) -> Self {
        Self {
            schema,
            id_column: id_column.to_string(),
            filters,
        }
    }

    pub fn posts(filters: Vec<FilterItem>) -> Self {
        Self::new(posts_schema(), "id", filters)
    }

    pub fn comments(filters: Vec<FilterItem>) -> Self {
        Self::new(comments_schema(), "comment_id", filters)
    }

    pub fn users(filters: Vec<FilterItem>) -> Self {
        Self::new(users_schema(), "id", filters)
    }

    pub fn options(filters: Vec<FilterItem>) -> Self {
        Self::new(options_schema(), "option_id", filters)
    }

    pub fn terms(filters: Vec<FilterItem>) -> Self {
        Self::new(terms_schema(), "term_id", filters)
    }
}

impl SourceHandler for RecordSource {
    fn schema(&self) -> &SchemaSource {
        &self.schema
    }

    fn id_column(&self) -> &str {
        &self.id_column
    }

    fn filters(&self) -> &[FilterItem] {
        &self.filters
    }

    fn preload(
        &self,
        column: &SchemaColumn,
        _filter: &FilterItem,
        executor: &dyn QueryExecutor,
    ) -> Vec<PreloadValue> {
        distinct_values(&self.schema.table, &column.column, executor)
    }
}

pub fn posts_schema() -> SchemaSource {
    SchemaSource::new(
        "posts",
        "posts",
        "post_title",
        vec![
            SchemaColumn::new("id", ColumnKind::Integer, "ID"),
            SchemaColumn::new("post_title", ColumnKind::String, "Title"),
            SchemaColumn::new("post_content", ColumnKind::String, "Content"),
            SchemaColumn::new("post_excerpt", ColumnKind::String, "Excerpt"),
            SchemaColumn::new("post_name", ColumnKind::String, "Slug"),
            SchemaColumn::new("post_status", ColumnKind::Member, "Status"),
            SchemaColumn::new("post_type", ColumnKind::Member, "Type"),
            SchemaColumn::new("post_author", ColumnKind::Integer, "Author").joined_by("user"),
            SchemaColumn::new("comment_count", ColumnKind::Integer, "Comment count"),
        ],
    )
}

pub fn comments_schema() -> SchemaSource {
    SchemaSource::new(
        "comments",
        "comments",
        "comment_author",
        vec![
            SchemaColumn::new("comment_id", ColumnKind::Integer, "ID"),
            SchemaColumn::new("comment_post_id", ColumnKind::Integer, "Post").joined_by("post"),
            SchemaColumn::new("comment_author", ColumnKind::String, "Author"),
            SchemaColumn::new("comment_author_email", ColumnKind::String, "Author email"),
            SchemaColumn::new("comment_author_url", ColumnKind::String, "Author URL"),
            SchemaColumn::new("comment_content", ColumnKind::String, "Content"),
            SchemaColumn::new("comment_approved", ColumnKind::Member, "Approved"),
            SchemaColumn::new("user_id", ColumnKind::Integer, "User").joined_by("user"),
        ],
    )
}

pub fn users_schema() -> SchemaSource {
    SchemaSource::new(
        "users",
        "users",
        "user_login",
        vec![
            SchemaColumn::new("id", ColumnKind::Integer, "ID"),
            SchemaColumn::new("user_login", ColumnKind::String, "Login"),
            SchemaColumn::new("user_nicename", ColumnKind::String, "Nice name"),
            SchemaColumn::new("user_email", ColumnKind::String, "Email"),
            SchemaColumn::new("user_url", ColumnKind::String, "URL"),
            SchemaColumn::new("display_name", ColumnKind::String, "Display name"),
        ],
    )
}

pub fn options_schema() -> SchemaSource {
    SchemaSource::new(
        "options",
        "options",
        "option_name",
        vec![
            SchemaColumn::new("option_id", ColumnKind::Integer, "ID"),
            SchemaColumn::new("option_name", ColumnKind::String, "Name"),
            SchemaColumn::new("option_value", ColumnKind::String, "Value"),
        ],
    )
}

pub fn terms_schema() -> SchemaSource {
    SchemaSource::new(
        "terms",
        "terms",
        "name",
        vec![
            SchemaColumn::new("term_id", ColumnKind::Integer, "ID"),
            SchemaColumn::new("name", ColumnKind::String, "Name"),
            SchemaColumn::new("slug", ColumnKind::String, "Slug"),
        ],
    )
}
