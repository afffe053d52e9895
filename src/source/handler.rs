//! Source handlers and the collaborator traits at the storage boundary.
//!
//! The core decides *what* to read or write; the collaborators decide how.
//! [`QueryExecutor`] runs a compiled query and returns rows, [`RowWriter`]
//! commits updates and deletes. Both may block on I/O; nothing in this module
//! does.

use crate::filter::FilterItem;
use crate::schema::{SchemaColumn, SchemaSource};
use crate::sql::{Query, Sql};
use serde::Serialize;
use std::fmt;

/// A fetched row: ordered column name to raw value pairs.
pub type Row = Vec<(String, String)>;

/// Upper bound on candidate values returned by a preload.
pub const PRELOAD_LIMIT: usize = 50;

/// Kind of storage failure, each with a stable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    Query,
    Write,
    Delete,
}

impl StoreErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            StoreErrorKind::Query => "store_query",
            StoreErrorKind::Write => "store_write",
            StoreErrorKind::Delete => "store_delete",
        }
    }
}

/// Structured storage failure. Write failures represent data-mutation risk
/// and must be propagated, never swallowed.
#[derive(Debug)]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.code(), self.message)
    }
}

impl std::error::Error for StoreError {}

/// Executes a compiled query against the underlying store.
pub trait QueryExecutor {
    fn execute(&self, sql: &Sql) -> Result<Vec<Row>, StoreError>;
}

/// Commits row mutations to the underlying store.
pub trait RowWriter {
    fn update(
        &mut self,
        table: &str,
        row_id: i64,
        updates: &[(String, String)],
    ) -> Result<(), StoreError>;

    fn delete(&mut self, table: &str, row_id: i64) -> Result<(), StoreError>;
}

/// A candidate value precomputed for a filter (see preload on the registry).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreloadValue {
    pub value: String,
    pub label: String,
}

/// Behavior of one instantiated source: its schema, the filters partitioned
/// to it, query assembly, preload, and write paths.
pub trait SourceHandler: fmt::Debug {
    fn schema(&self) -> &SchemaSource;

    /// Primary key column of the source table.
    fn id_column(&self) -> &str {
        "id"
    }

    fn filters(&self) -> &[FilterItem];

    /// Merge every filter's contribution into one query, always selecting the
    /// id and title columns, then fold join where-fragments into the tree.
    fn build_query(&self) -> Query {
        let mut query = Query::new();
        query.add_select(self.id_column());
        query.add_select(&self.schema().title_column);
        for filter in self.filters() {
            query.merge(filter.query_contribution());
        }
        query.apply_join_wheres();
        query
    }

    /// Compile to placeholder SQL for the source table.
    fn render_query(&self) -> Sql {
        self.build_query().render(&self.schema().table)
    }

    /// Enumerate candidate values for an eligible filter. Sources without a
    /// cheap enumeration return nothing.
    fn preload(
        &self,
        _column: &SchemaColumn,
        _filter: &FilterItem,
        _executor: &dyn QueryExecutor,
    ) -> Vec<PreloadValue> {
        Vec::new()
    }

    /// Write replacement values for one row through the collaborator.
    fn save(
        &self,
        row_id: i64,
        updates: &[(String, String)],
        writer: &mut dyn RowWriter,
    ) -> Result<(), StoreError> {
        if updates.is_empty() {
            return Ok(());
        }
        writer.update(&self.schema().table, row_id, updates)
    }

    /// Delete one row through the collaborator.
    fn delete(&self, row_id: i64, writer: &mut dyn RowWriter) -> Result<(), StoreError> {
        writer.delete(&self.schema().table, row_id)
    }
}

/// Enumerate distinct values of a column, for preload. Query failures degrade
/// to an empty candidate list with a warning; preload is an accelerator, not
/// a correctness requirement.
pub fn distinct_values(
    table: &str,
    column: &str,
    executor: &dyn QueryExecutor,
) -> Vec<PreloadValue> {
    let sql = Sql {
        text: format!(
            "SELECT DISTINCT {} FROM {} LIMIT {}",
            column, table, PRELOAD_LIMIT
        ),
        params: Vec::new(),
    };
    match executor.execute(&sql) {
        Ok(rows) => rows
            .into_iter()
            .filter_map(|row| row.into_iter().next())
            .map(|(_, value)| PreloadValue {
                label: value.clone(),
                value,
            })
            .collect(),
        Err(err) => {
            eprintln!("Warning: preload query failed for {}.{}: {}", table, column, err);
            Vec::new()
        }
    }
}
