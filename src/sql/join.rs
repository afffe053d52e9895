//! Join resolution for membership-style filters.
//!
//! A `joined_by` relation name on a schema column maps to a concrete join
//! against the related table. Membership matching ("has"/"hasnot") is
//! expressed as row existence in the joined table, so a join contributes both
//! a join clause and a null-test where-fragment — merged into the query
//! separately because a join changes row cardinality semantics.

use super::clause::WhereNode;

/// The related table a join targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Post,
    Comment,
    User,
    Term,
}

impl JoinKind {
    fn from_relation(relation: &str) -> Option<JoinKind> {
        match relation {
            "post" => Some(JoinKind::Post),
            "comment" => Some(JoinKind::Comment),
            "user" => Some(JoinKind::User),
            "term" => Some(JoinKind::Term),
            _ => None,
        }
    }

    pub fn target_table(&self) -> &'static str {
        match self {
            JoinKind::Post => "posts",
            JoinKind::Comment => "comments",
            JoinKind::User => "users",
            JoinKind::Term => "terms",
        }
    }

    fn target_key(&self) -> &'static str {
        match self {
            JoinKind::Post => "id",
            JoinKind::Comment => "comment_id",
            JoinKind::User => "id",
            JoinKind::Term => "term_id",
        }
    }

    /// Only these kinds are legal targets for membership logic. Callers must
    /// check before trusting a resolved join.
    pub fn is_member_target(&self) -> bool {
        matches!(self, JoinKind::Post | JoinKind::Comment | JoinKind::User)
    }
}

/// Inclusion logic for a membership join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inclusion {
    /// A related row must exist.
    Has,
    /// No related row may exist.
    HasNot,
}

/// A resolved join, owned by the filter that created it. Immutable after
/// resolution: inclusion is fixed at filter construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    kind: JoinKind,
    inclusion: Inclusion,
    from_table: String,
    from_column: String,
}

impl Join {
    /// Map a relation name to a concrete join. Unknown names yield `None`.
    pub fn resolve(
        relation: &str,
        inclusion: Inclusion,
        from_table: &str,
        from_column: &str,
    ) -> Option<Join> {
        JoinKind::from_relation(relation).map(|kind| Join {
            kind,
            inclusion,
            from_table: from_table.to_string(),
            from_column: from_column.to_string(),
        })
    }

    pub fn kind(&self) -> JoinKind {
        self.kind
    }

    /// The joined table name, used to deduplicate joins within a query.
    pub fn target(&self) -> &'static str {
        self.kind.target_table()
    }

    /// `LEFT JOIN target ON target.key = source.column`.
    ///
    /// Always a LEFT JOIN so exclusion can be expressed as a null test
    /// without changing the join shape.
    pub fn join_clause(&self) -> String {
        let table = self.kind.target_table();
        format!(
            "LEFT JOIN {} ON {}.{} = {}.{}",
            table,
            table,
            self.kind.target_key(),
            self.from_table,
            self.from_column
        )
    }

    /// The inclusion/exclusion test on the joined key.
    pub fn where_fragment(&self) -> WhereNode {
        WhereNode::Null {
            column: format!("{}.{}", self.kind.target_table(), self.kind.target_key()),
            negated: matches!(self.inclusion, Inclusion::Has),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::SqlValue;

    #[test]
    fn test_resolve_known_relations() {
        for (relation, kind) in [
            ("post", JoinKind::Post),
            ("comment", JoinKind::Comment),
            ("user", JoinKind::User),
            ("term", JoinKind::Term),
        ] {
            let join = Join::resolve(relation, Inclusion::Has, "postmeta", "post_id").unwrap();
            assert_eq!(join.kind(), kind);
        }
    }

    #[test]
    fn test_resolve_unknown_relation() {
        assert!(Join::resolve("shortcode", Inclusion::Has, "posts", "id").is_none());
    }

    #[test]
    fn test_member_target_legality() {
        assert!(JoinKind::Post.is_member_target());
        assert!(JoinKind::Comment.is_member_target());
        assert!(JoinKind::User.is_member_target());
        assert!(!JoinKind::Term.is_member_target());
    }

    #[test]
    fn test_join_clause() {
        let join = Join::resolve("post", Inclusion::Has, "postmeta", "post_id").unwrap();
        assert_eq!(
            join.join_clause(),
            "LEFT JOIN posts ON posts.id = postmeta.post_id"
        );
    }

    #[test]
    fn test_where_fragment_has() {
        let join = Join::resolve("user", Inclusion::Has, "posts", "post_author").unwrap();
        let mut text = String::new();
        let mut params = Vec::<SqlValue>::new();
        join.where_fragment().render(&mut text, &mut params);
        assert_eq!(text, "users.id IS NOT NULL");
        assert!(params.is_empty());
    }

    #[test]
    fn test_where_fragment_hasnot() {
        let join = Join::resolve("comment", Inclusion::HasNot, "commentmeta", "comment_id").unwrap();
        let mut text = String::new();
        let mut params = Vec::<SqlValue>::new();
        join.where_fragment().render(&mut text, &mut params);
        assert_eq!(text, "comments.comment_id IS NULL");
    }
}
