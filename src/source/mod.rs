//! The source registry: maps logical source names to schemas and handlers.
//!
//! Built-in sources are registered in a static constructor table. External
//! providers extend the registry through transformation callbacks applied
//! deterministically at construction, before any concurrent reads — there is
//! no runtime discovery.

pub mod handler;
pub mod meta;
pub mod record;

pub use handler::{
    PreloadValue, QueryExecutor, Row, RowWriter, SourceHandler, StoreError, StoreErrorKind,
};
pub use meta::{MetaSource, MetaTable};
pub use record::RecordSource;

use crate::filter::{FilterItem, RawFilter};
use crate::schema::{ColumnKind, SchemaSource};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Category a source is listed under in pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceGroup {
    Core,
    Advanced,
    Plugin,
}

impl SourceGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceGroup::Core => "core",
            SourceGroup::Advanced => "advanced",
            SourceGroup::Plugin => "plugin",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SourceGroup::Core => "Standard",
            SourceGroup::Advanced => "Advanced",
            SourceGroup::Plugin => "Plugins",
        }
    }
}

impl fmt::Display for SourceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UI-facing pickable form of a source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceDescriptor {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub group: SourceGroup,
}

/// Constructor for a source handler, given the filters partitioned to it.
pub type SourceCtor = fn(Vec<FilterItem>) -> Box<dyn SourceHandler>;

/// A registered source: descriptor plus constructor.
#[derive(Clone)]
pub struct SourceEntry {
    pub descriptor: SourceDescriptor,
    pub ctor: SourceCtor,
}

impl SourceEntry {
    pub fn new(name: &str, label: &str, group: SourceGroup, ctor: SourceCtor) -> Self {
        Self {
            descriptor: SourceDescriptor {
                name: name.to_string(),
                label: label.to_string(),
                group,
            },
            ctor,
        }
    }
}

/// Pure transformation over the entry list, supplied by an external provider.
pub type SourceTransform = fn(Vec<SourceEntry>) -> Vec<SourceEntry>;

fn make_posts(filters: Vec<FilterItem>) -> Box<dyn SourceHandler> {
    Box::new(RecordSource::posts(filters))
}

fn make_comments(filters: Vec<FilterItem>) -> Box<dyn SourceHandler> {
    Box::new(RecordSource::comments(filters))
}

fn make_users(filters: Vec<FilterItem>) -> Box<dyn SourceHandler> {
    Box::new(RecordSource::users(filters))
}

fn make_options(filters: Vec<FilterItem>) -> Box<dyn SourceHandler> {
    Box::new(RecordSource::options(filters))
}

fn make_terms(filters: Vec<FilterItem>) -> Box<dyn SourceHandler> {
    Box::new(RecordSource::terms(filters))
}

fn make_post_meta(filters: Vec<FilterItem>) -> Box<dyn SourceHandler> {
    Box::new(MetaSource::new(MetaTable::Post, filters))
}

fn make_comment_meta(filters: Vec<FilterItem>) -> Box<dyn SourceHandler> {
    Box::new(MetaSource::new(MetaTable::Comment, filters))
}

fn make_user_meta(filters: Vec<FilterItem>) -> Box<dyn SourceHandler> {
    Box::new(MetaSource::new(MetaTable::User, filters))
}

fn builtin_entries() -> Vec<SourceEntry> {
    vec![
        SourceEntry::new("posts", "Posts", SourceGroup::Core, make_posts),
        SourceEntry::new("comments", "Comments", SourceGroup::Core, make_comments),
        SourceEntry::new("users", "Users", SourceGroup::Core, make_users),
        SourceEntry::new("options", "Options", SourceGroup::Core, make_options),
        SourceEntry::new("post-meta", "Post Meta", SourceGroup::Advanced, make_post_meta),
        SourceEntry::new(
            "comment-meta",
            "Comment Meta",
            SourceGroup::Advanced,
            make_comment_meta,
        ),
        SourceEntry::new("user-meta", "User Meta", SourceGroup::Advanced, make_user_meta),
        SourceEntry::new("terms", "Terms", SourceGroup::Advanced, make_terms),
    ]
}

/// The dispatch layer from logical source names to schemas and handlers.
/// Constructed once at startup; read-only afterwards.
pub struct SourceRegistry {
    entries: Vec<SourceEntry>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::with_transforms(&[])
    }

    /// Build the registry from the built-in table, then apply provider
    /// transforms in order. Entries a transform adds are forced into the
    /// plugin group; duplicate names keep the first-seen entry.
    pub fn with_transforms(transforms: &[SourceTransform]) -> Self {
        let builtin_names: HashSet<String> = builtin_entries()
            .into_iter()
            .map(|e| e.descriptor.name)
            .collect();

        let mut entries = builtin_entries();
        for transform in transforms {
            entries = transform(entries);
            for entry in &mut entries {
                if !builtin_names.contains(&entry.descriptor.name) {
                    entry.descriptor.group = SourceGroup::Plugin;
                }
            }
        }

        let mut seen = HashSet::new();
        entries.retain(|e| seen.insert(e.descriptor.name.clone()));

        Self { entries }
    }

    /// All descriptors, in registration order.
    pub fn descriptors(&self) -> Vec<SourceDescriptor> {
        self.entries.iter().map(|e| e.descriptor.clone()).collect()
    }

    /// All source names; useful for validating a requested name.
    pub fn names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| e.descriptor.name.clone())
            .collect()
    }

    /// Descriptors grouped by category, non-empty groups only.
    pub fn grouped(&self) -> Vec<(SourceGroup, Vec<SourceDescriptor>)> {
        [SourceGroup::Core, SourceGroup::Advanced, SourceGroup::Plugin]
            .into_iter()
            .filter_map(|group| {
                let members: Vec<SourceDescriptor> = self
                    .entries
                    .iter()
                    .filter(|e| e.descriptor.group == group)
                    .map(|e| e.descriptor.clone())
                    .collect();
                if members.is_empty() {
                    None
                } else {
                    Some((group, members))
                }
            })
            .collect()
    }

    /// Schema for one source, or `None` for unknown names.
    pub fn schema_for(&self, name: &str) -> Option<SchemaSource> {
        self.get(name, &[]).map(|handler| handler.schema().clone())
    }

    /// Schemas filtered to the requested group names; empty means all.
    pub fn schemas(&self, groups: &[String]) -> Vec<SchemaSource> {
        self.entries
            .iter()
            .filter(|e| {
                groups.is_empty() || groups.iter().any(|g| g == e.descriptor.group.as_str())
            })
            .map(|e| {
                let handler = (e.ctor)(Vec::new());
                handler.schema().clone()
            })
            .collect()
    }

    /// Instantiate the named source's handler with the subset of `filters`
    /// targeting it. Unknown names return `None`; callers skip the item
    /// rather than failing the whole request.
    pub fn get(&self, name: &str, filters: &[FilterItem]) -> Option<Box<dyn SourceHandler>> {
        let entry = self.entries.iter().find(|e| e.descriptor.name == name)?;
        let own: Vec<FilterItem> = filters
            .iter()
            .filter(|f| f.is_for_source(name))
            .cloned()
            .collect();
        Some((entry.ctor)(own))
    }

    /// Instantiate several sources, silently omitting unknown names.
    pub fn get_many(
        &self,
        names: &[String],
        filters: &[FilterItem],
    ) -> Vec<Box<dyn SourceHandler>> {
        names
            .iter()
            .filter_map(|name| self.get(name, filters))
            .collect()
    }

    /// Build filters for one source from their wire forms, skipping unknown
    /// columns.
    pub fn build_filters(&self, source: &str, raws: &[RawFilter]) -> Vec<FilterItem> {
        let Some(schema) = self.schema_for(source) else {
            return Vec::new();
        };
        raws.iter()
            .filter_map(|raw| {
                schema
                    .column(&raw.column)
                    .and_then(|column| FilterItem::create(raw, column, &schema))
            })
            .collect()
    }

    /// Precompute candidate values for a single raw filter, when its matching
    /// can be accelerated: member columns always qualify, integer columns only
    /// under (absent or) equality logic. Everything else returns empty.
    pub fn preload(
        &self,
        name: &str,
        raw: &RawFilter,
        executor: &dyn QueryExecutor,
    ) -> Vec<PreloadValue> {
        if raw.column.is_empty() {
            return Vec::new();
        }
        let Some(handler) = self.get(name, &[]) else {
            return Vec::new();
        };
        let Some(column) = handler.schema().column(&raw.column) else {
            return Vec::new();
        };

        let eligible = match column.kind {
            ColumnKind::Member => true,
            ColumnKind::Integer => raw.logic.as_deref().map_or(true, |logic| {
                let logic = logic.to_lowercase();
                logic == "equals" || logic == "notequals"
            }),
            ColumnKind::String => false,
        };
        if !eligible {
            return Vec::new();
        }

        let Some(filter) = FilterItem::create(raw, column, handler.schema()) else {
            return Vec::new();
        };
        handler.preload(column, &filter, executor)
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::Sql;

    struct FakeExecutor;

    impl QueryExecutor for FakeExecutor {
        fn execute(&self, _sql: &Sql) -> Result<Vec<Row>, StoreError> {
            Ok(vec![
                vec![("post_status".to_string(), "publish".to_string())],
                vec![("post_status".to_string(), "draft".to_string())],
            ])
        }
    }

    #[test]
    fn test_builtin_grouping() {
        let registry = SourceRegistry::new();
        let grouped = registry.grouped();
        assert_eq!(grouped.len(), 2); // no plugin sources by default
        assert_eq!(grouped[0].0, SourceGroup::Core);
        assert_eq!(grouped[0].1.len(), 4);
        assert_eq!(grouped[1].0, SourceGroup::Advanced);
        assert_eq!(grouped[1].1.len(), 4);
    }

    #[test]
    fn test_unknown_source_returns_none() {
        let registry = SourceRegistry::new();
        assert!(registry.get("nonexistent", &[]).is_none());
        assert!(registry.schema_for("nonexistent").is_none());
    }

    #[test]
    fn test_get_many_omits_unknown_names() {
        let registry = SourceRegistry::new();
        let handlers = registry.get_many(
            &["posts".to_string(), "bogus".to_string(), "users".to_string()],
            &[],
        );
        assert_eq!(handlers.len(), 2);
        assert_eq!(handlers[0].schema().source, "posts");
        assert_eq!(handlers[1].schema().source, "users");
    }

    #[test]
    fn test_get_partitions_filters_by_source() {
        let registry = SourceRegistry::new();
        let mut filters = registry.build_filters(
            "posts",
            &[RawFilter {
                column: "comment_count".into(),
                logic: Some("greater".into()),
                start_value: Some("1".into()),
                ..Default::default()
            }],
        );
        filters.extend(registry.build_filters(
            "users",
            &[RawFilter {
                column: "user_login".into(),
                logic: Some("contains".into()),
                value: Some("bot".into()),
                ..Default::default()
            }],
        ));
        assert_eq!(filters.len(), 2);

        let posts = registry.get("posts", &filters).unwrap();
        assert_eq!(posts.filters().len(), 1);
        assert_eq!(posts.filters()[0].column(), "comment_count");

        let users = registry.get("users", &filters).unwrap();
        assert_eq!(users.filters().len(), 1);
        assert_eq!(users.filters()[0].column(), "user_login");
    }

    #[test]
    fn test_build_filters_skips_unknown_columns() {
        let registry = SourceRegistry::new();
        let filters = registry.build_filters(
            "posts",
            &[
                RawFilter {
                    column: "no_such_column".into(),
                    ..Default::default()
                },
                RawFilter {
                    column: "post_title".into(),
                    value: Some("hi".into()),
                    ..Default::default()
                },
            ],
        );
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].column(), "post_title");
    }

    #[test]
    fn test_schemas_filtered_by_group() {
        let registry = SourceRegistry::new();
        assert_eq!(registry.schemas(&[]).len(), 8);
        let advanced = registry.schemas(&["advanced".to_string()]);
        assert_eq!(advanced.len(), 4);
        assert!(advanced.iter().any(|s| s.source == "comment-meta"));
    }

    #[test]
    fn test_preload_eligibility() {
        let registry = SourceRegistry::new();
        let executor = FakeExecutor;

        // Member column: eligible.
        let values = registry.preload(
            "posts",
            &RawFilter {
                column: "post_status".into(),
                ..Default::default()
            },
            &executor,
        );
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].value, "publish");

        // Integer column with equality logic: eligible.
        let values = registry.preload(
            "posts",
            &RawFilter {
                column: "comment_count".into(),
                logic: Some("equals".into()),
                ..Default::default()
            },
            &executor,
        );
        assert!(!values.is_empty());

        // Integer column with range logic: not eligible.
        let values = registry.preload(
            "posts",
            &RawFilter {
                column: "comment_count".into(),
                logic: Some("range".into()),
                ..Default::default()
            },
            &executor,
        );
        assert!(values.is_empty());

        // String column: never eligible.
        let values = registry.preload(
            "posts",
            &RawFilter {
                column: "post_title".into(),
                ..Default::default()
            },
            &executor,
        );
        assert!(values.is_empty());

        // Unknown source or column: empty, no failure.
        assert!(registry
            .preload(
                "bogus",
                &RawFilter {
                    column: "post_status".into(),
                    ..Default::default()
                },
                &executor
            )
            .is_empty());
        assert!(registry
            .preload(
                "posts",
                &RawFilter {
                    column: "missing".into(),
                    ..Default::default()
                },
                &executor
            )
            .is_empty());
    }

    fn add_audit_source(mut entries: Vec<SourceEntry>) -> Vec<SourceEntry> {
        entries.push(SourceEntry::new(
            "audit-log",
            "Audit Log",
            SourceGroup::Core, // forced to plugin by the registry
            make_options,
        ));
        entries
    }

    fn drop_terms(entries: Vec<SourceEntry>) -> Vec<SourceEntry> {
        entries
            .into_iter()
            .filter(|e| e.descriptor.name != "terms")
            .collect()
    }

    #[test]
    fn test_transforms_applied_in_order() {
        let registry = SourceRegistry::with_transforms(&[add_audit_source, drop_terms]);
        let names = registry.names();
        assert!(names.contains(&"audit-log".to_string()));
        assert!(!names.contains(&"terms".to_string()));

        // Added entries always land in the plugin group.
        let grouped = registry.grouped();
        let (group, plugins) = grouped.last().unwrap();
        assert_eq!(*group, SourceGroup::Plugin);
        assert_eq!(plugins[0].name, "audit-log");
    }

    #[test]
    fn test_duplicate_names_keep_first_seen() {
        fn add_duplicate_posts(mut entries: Vec<SourceEntry>) -> Vec<SourceEntry> {
            entries.push(SourceEntry::new(
                "posts",
                "Shadow Posts",
                SourceGroup::Plugin,
                make_options,
            ));
            entries
        }
        let registry = SourceRegistry::with_transforms(&[add_duplicate_posts]);
        let descriptors = registry.descriptors();
        let posts: Vec<_> = descriptors.iter().filter(|d| d.name == "posts").collect();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].label, "Posts");
    }

    #[test]
    fn test_descriptor_serializes_type_field() {
        let registry = SourceRegistry::new();
        let json = serde_json::to_value(registry.descriptors()).unwrap();
        assert_eq!(json[0]["name"], "posts");
        assert_eq!(json[0]["type"], "core");
    }
}
