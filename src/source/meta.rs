//! Shared handler for the key/value meta tables.
//!
//! The three meta sources differ only in table naming and which record table
//! owns their rows, so one handler covers them, parameterized by [`MetaTable`].

use super::handler::{
    distinct_values, PreloadValue, QueryExecutor, RowWriter, SourceHandler, StoreError,
};
use crate::filter::FilterItem;
use crate::schema::{ColumnKind, SchemaColumn, SchemaSource};

/// Which meta table a [`MetaSource`] works against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaTable {
    Post,
    Comment,
    User,
}

impl MetaTable {
    pub fn source_name(&self) -> &'static str {
        match self {
            MetaTable::Post => "post-meta",
            MetaTable::Comment => "comment-meta",
            MetaTable::User => "user-meta",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MetaTable::Post => "Post Meta",
            MetaTable::Comment => "Comment Meta",
            MetaTable::User => "User Meta",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            MetaTable::Post => "postmeta",
            MetaTable::Comment => "commentmeta",
            MetaTable::User => "usermeta",
        }
    }

    /// Column holding the owning record's ID.
    pub fn object_column(&self) -> &'static str {
        match self {
            MetaTable::Post => "post_id",
            MetaTable::Comment => "comment_id",
            MetaTable::User => "user_id",
        }
    }

    /// Relation name for joining back to the owning record table.
    fn relation(&self) -> &'static str {
        match self {
            MetaTable::Post => "post",
            MetaTable::Comment => "comment",
            MetaTable::User => "user",
        }
    }

    pub fn schema(&self) -> SchemaSource {
        SchemaSource::new(
            self.source_name(),
            self.table(),
            "meta_key",
            vec![
                SchemaColumn::new(self.object_column(), ColumnKind::Integer, "Owner ID")
                    .joined_by(self.relation()),
                SchemaColumn::new("meta_key", ColumnKind::String, "Meta Key"),
                SchemaColumn::new("meta_value", ColumnKind::String, "Meta Value"),
            ],
        )
    }
}

/// Handler for one meta table.
#[derive(Debug)]
pub struct MetaSource {
    table: MetaTable,
    schema: SchemaSource,
    filters: Vec<FilterItem>,
}

impl MetaSource {
    pub fn new(table: MetaTable, filters: Vec<FilterItem>) -> Self {
        Self {
            table,
            schema: table.schema(),
            filters,
        }
    }
}

impl SourceHandler for MetaSource {
    fn schema(&self) -> &SchemaSource {
        &self.schema
    }

    fn id_column(&self) -> &str {
        "meta_id"
    }

    fn filters(&self) -> &[FilterItem] {
        &self.filters
    }

    /// Meta values are expensive to test per-row (joined lookups), so
    /// candidate enumeration pays off for every column here.
    fn preload(
        &self,
        column: &SchemaColumn,
        _filter: &FilterItem,
        executor: &dyn QueryExecutor,
    ) -> Vec<PreloadValue> {
        distinct_values(self.table.table(), &column.column, executor)
    }

    fn save(
        &self,
        row_id: i64,
        updates: &[(String, String)],
        writer: &mut dyn RowWriter,
    ) -> Result<(), StoreError> {
        // Only meta_key/meta_value are writable; the owner ID is structural.
        let writable: Vec<(String, String)> = updates
            .iter()
            .filter(|(column, _)| column == "meta_key" || column == "meta_value")
            .cloned()
            .collect();
        if writable.is_empty() {
            return Ok(());
        }
        writer.update(self.table.table(), row_id, &writable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::RawFilter;
    use crate::source::handler::StoreErrorKind;

    fn filter_for(schema: &SchemaSource, raw: RawFilter) -> FilterItem {
        let column = schema.column(&raw.column).unwrap().clone();
        FilterItem::create(&raw, &column, schema).unwrap()
    }

    #[test]
    fn test_meta_schemas() {
        let schema = MetaTable::Comment.schema();
        assert_eq!(schema.source, "comment-meta");
        assert_eq!(schema.table, "commentmeta");
        assert_eq!(
            schema.column("comment_id").unwrap().joined_by.as_deref(),
            Some("comment")
        );
        assert_eq!(MetaTable::Post.schema().table, "postmeta");
        assert_eq!(MetaTable::User.object_column(), "user_id");
    }

    #[test]
    fn test_owner_has_filter_joins_owning_table() {
        let schema = MetaTable::Post.schema();
        let filters = vec![filter_for(
            &schema,
            RawFilter {
                column: "post_id".into(),
                logic: Some("has".into()),
                ..Default::default()
            },
        )];
        let source = MetaSource::new(MetaTable::Post, filters);
        let sql = source.render_query();
        assert_eq!(
            sql.text,
            "SELECT meta_id, meta_key, post_id FROM postmeta \
             LEFT JOIN posts ON posts.id = postmeta.post_id \
             WHERE posts.id IS NOT NULL"
        );
    }

    struct RecordingWriter {
        updates: Vec<(String, i64, Vec<(String, String)>)>,
        fail: bool,
    }

    impl RowWriter for RecordingWriter {
        fn update(
            &mut self,
            table: &str,
            row_id: i64,
            updates: &[(String, String)],
        ) -> Result<(), StoreError> {
            if self.fail {
                return Err(StoreError::new(StoreErrorKind::Write, "disk full"));
            }
            self.updates
                .push((table.to_string(), row_id, updates.to_vec()));
            Ok(())
        }

        fn delete(&mut self, _table: &str, _row_id: i64) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn test_save_filters_to_writable_columns() {
        let source = MetaSource::new(MetaTable::Post, Vec::new());
        let mut writer = RecordingWriter {
            updates: Vec::new(),
            fail: false,
        };
        source
            .save(
                7,
                &[
                    ("post_id".to_string(), "9".to_string()),
                    ("meta_value".to_string(), "new".to_string()),
                ],
                &mut writer,
            )
            .unwrap();
        assert_eq!(writer.updates.len(), 1);
        let (table, row_id, updates) = &writer.updates[0];
        assert_eq!(table, "postmeta");
        assert_eq!(*row_id, 7);
        assert_eq!(updates, &[("meta_value".to_string(), "new".to_string())]);
    }

    #[test]
    fn test_save_failure_propagates() {
        let source = MetaSource::new(MetaTable::User, Vec::new());
        let mut writer = RecordingWriter {
            updates: Vec::new(),
            fail: true,
        };
        let err = source
            .save(1, &[("meta_key".to_string(), "k".to_string())], &mut writer)
            .unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::Write);
    }
}
