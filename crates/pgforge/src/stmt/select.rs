//! SELECT descriptor and builder.

use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};
use crate::fragment::{Fragment, Node};
use crate::stmt::{Direction, Join, JoinKind, Modifier, TableRef, conjoin, order_entry};

/// An immutable SELECT statement descriptor.
///
/// Built clause by clause through operations that each return a new value;
/// the starting descriptor is never mutated, so any intermediate state can
/// be kept and extended along several branches.
#[derive(Clone, Debug, Default)]
pub struct Select {
    tables: Vec<(String, TableRef)>,
    joins: Vec<Join>,
    fields: Option<Vec<(String, Node)>>,
    where_: Option<Node>,
    group: Option<Vec<Node>>,
    having: Option<Node>,
    order: Vec<(Node, Direction)>,
    modifier: Option<Modifier>,
    offset: Option<i64>,
    limit: Option<i64>,
}

impl Select {
    /// Create an empty descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    fn join_ref(
        &self,
        alias: &str,
        table: TableRef,
        kind: JoinKind,
        on: Option<Node>,
    ) -> SqlResult<Select> {
        if self.tables.iter().any(|(existing, _)| existing == alias) {
            return Err(SqlError::DuplicateAlias(alias.to_string()));
        }
        if self.joins.is_empty() && !kind.can_lead() {
            return Err(SqlError::structural(
                "first relation must be attached via comma or CROSS JOIN",
            ));
        }
        let mut next = self.clone();
        next.tables.push((alias.to_string(), table));
        next.joins.push(Join {
            alias: alias.to_string(),
            kind,
            on,
        });
        Ok(next)
    }

    /// Attach the base table (comma attachment, no ON clause).
    pub fn from(&self, alias: &str, table: &str) -> SqlResult<Select> {
        self.join_ref(alias, TableRef::Name(table.to_string()), JoinKind::None, None)
    }

    /// Attach a subquery as a relation under `alias`.
    pub fn from_subquery(&self, alias: &str, subquery: Select) -> SqlResult<Select> {
        self.join_ref(
            alias,
            TableRef::Subquery(Box::new(subquery)),
            JoinKind::None,
            None,
        )
    }

    /// Attach a relation with an explicit join kind and optional ON predicate.
    ///
    /// Fails with [`SqlError::DuplicateAlias`] when `alias` is taken, and
    /// with [`SqlError::Structural`] when the first relation uses a keyed
    /// join kind.
    pub fn join(
        &self,
        alias: &str,
        table: &str,
        kind: JoinKind,
        on: Option<Node>,
    ) -> SqlResult<Select> {
        self.join_ref(alias, TableRef::Name(table.to_string()), kind, on)
    }

    /// INNER JOIN convenience.
    pub fn inner_join(&self, alias: &str, table: &str, on: Node) -> SqlResult<Select> {
        self.join(alias, table, JoinKind::Inner, Some(on))
    }

    /// LEFT JOIN convenience.
    pub fn left_join(&self, alias: &str, table: &str, on: Node) -> SqlResult<Select> {
        self.join(alias, table, JoinKind::Left, Some(on))
    }

    /// CROSS JOIN convenience.
    pub fn cross_join(&self, alias: &str, table: &str) -> SqlResult<Select> {
        self.join(alias, table, JoinKind::Cross, None)
    }

    /// Set the field list as alias/expression pairs. Settable once.
    pub fn fields<S: Into<String>>(
        &self,
        fields: impl IntoIterator<Item = (S, Node)>,
    ) -> SqlResult<Select> {
        if self.fields.is_some() {
            return Err(SqlError::DuplicateClause("fields"));
        }
        let mut next = self.clone();
        next.fields = Some(
            fields
                .into_iter()
                .map(|(alias, node)| (alias.into(), node))
                .collect(),
        );
        Ok(next)
    }

    /// Set the field list from plain column names; each entry's alias
    /// defaults to its own name.
    pub fn field_names(&self, names: &[&str]) -> SqlResult<Select> {
        self.fields(
            names
                .iter()
                .map(|name| (name.to_string(), Node::name(*name))),
        )
    }

    /// Add a WHERE predicate; repeated calls conjoin with AND.
    pub fn filter(&self, expr: Node) -> Select {
        let mut next = self.clone();
        next.where_ = conjoin(next.where_.take(), expr);
        next
    }

    /// Add a HAVING predicate; repeated calls conjoin with AND.
    pub fn having(&self, expr: Node) -> Select {
        let mut next = self.clone();
        next.having = conjoin(next.having.take(), expr);
        next
    }

    /// Set the grouping keys. Settable once.
    ///
    /// A list or parenthesized node contributes its elements; any other node
    /// is normalized to a one-element key sequence.
    pub fn group(&self, keys: Node) -> SqlResult<Select> {
        if self.group.is_some() {
            return Err(SqlError::DuplicateClause("group"));
        }
        let mut next = self.clone();
        next.group = Some(match keys.remove_parenthesis() {
            Node::List(items) => items,
            single => vec![single],
        });
        Ok(next)
    }

    /// Prepend an ORDER BY entry.
    ///
    /// Entries accumulate in reverse-insertion order: the last call renders
    /// first.
    pub fn order_by(&self, column: Node, dir: Direction) -> Select {
        let mut next = self.clone();
        next.order.insert(0, (column, dir));
        next
    }

    /// Set DISTINCT or ALL. Settable once.
    pub fn modifier(&self, modifier: Modifier) -> SqlResult<Select> {
        if self.modifier.is_some() {
            return Err(SqlError::DuplicateClause("modifier"));
        }
        let mut next = self.clone();
        next.modifier = Some(modifier);
        Ok(next)
    }

    /// Set LIMIT to a non-negative row count. Settable once.
    pub fn limit(&self, n: i64) -> SqlResult<Select> {
        if self.limit.is_some() {
            return Err(SqlError::DuplicateClause("limit"));
        }
        if n < 0 {
            return Err(SqlError::invalid_argument(format!("negative limit: {n}")));
        }
        let mut next = self.clone();
        next.limit = Some(n);
        Ok(next)
    }

    /// Set OFFSET to a non-negative row count. Settable once.
    pub fn offset(&self, n: i64) -> SqlResult<Select> {
        if self.offset.is_some() {
            return Err(SqlError::DuplicateClause("offset"));
        }
        if n < 0 {
            return Err(SqlError::invalid_argument(format!("negative offset: {n}")));
        }
        let mut next = self.clone();
        next.offset = Some(n);
        Ok(next)
    }

    fn field_entry(alias: &str, node: &Node) -> Node {
        if let Node::Name(name) = node {
            let last = name.rsplit('.').next().unwrap_or(name);
            if alias == name || alias == last {
                return node.clone();
            }
        }
        Node::list([node.clone(), Node::raw("AS"), Node::name(alias)])
    }

    fn relation_node(&self, alias: &str, dialect: &Dialect) -> Node {
        self.tables
            .iter()
            .find(|(existing, _)| existing == alias)
            .map(|(_, table)| table.to_node(alias, dialect))
            .unwrap_or_else(|| Node::name(alias))
    }

    /// Render into one [`Fragment`] in canonical clause order.
    pub fn render(&self, dialect: &Dialect) -> Fragment {
        let mut parts: Vec<Node> = vec![Node::raw("SELECT")];

        if let Some(modifier) = self.modifier {
            parts.push(Node::raw(modifier.keyword()));
        }

        match &self.fields {
            Some(fields) => parts.push(Node::separated(
                fields
                    .iter()
                    .map(|(alias, node)| Self::field_entry(alias, node)),
                ",",
            )),
            None => parts.push(Node::raw("*")),
        }

        parts.push(Node::raw("FROM"));
        for (i, join) in self.joins.iter().enumerate() {
            let relation = self.relation_node(&join.alias, dialect);
            if i == 0 {
                parts.push(relation);
                continue;
            }
            match join.kind.keyword() {
                None => {
                    parts.push(Node::raw(","));
                    parts.push(relation);
                }
                Some(keyword) => {
                    parts.push(Node::raw(keyword));
                    parts.push(relation);
                    // Cross joins never take an ON clause, even if one was
                    // mistakenly supplied.
                    if join.kind != JoinKind::Cross
                        && let Some(on) = &join.on
                    {
                        parts.push(Node::raw("ON"));
                        parts.push(on.clone());
                    }
                }
            }
        }

        if let Some(where_) = &self.where_ {
            parts.push(Node::raw("WHERE"));
            parts.push(where_.clone());
        }

        if let Some(group) = &self.group {
            parts.push(Node::raw("GROUP BY"));
            parts.push(Node::separated(group.iter().cloned(), ","));
        }

        if let Some(having) = &self.having {
            parts.push(Node::raw("HAVING"));
            parts.push(having.clone());
        }

        if !self.order.is_empty() {
            parts.push(Node::raw("ORDER BY"));
            parts.push(Node::separated(
                self.order.iter().map(|(expr, dir)| order_entry(expr, *dir)),
                ",",
            ));
        }

        // LIMIT and OFFSET travel together: an offset without a limit gets
        // the widest representable limit so pagination stays portable. Both
        // are raw numeric text, not bind parameters.
        if self.limit.is_some() || self.offset.is_some() {
            parts.push(Node::raw(format!(
                "LIMIT {}",
                self.limit.unwrap_or(i64::MAX)
            )));
            if let Some(offset) = self.offset {
                parts.push(Node::raw(format!("OFFSET {offset}")));
            }
        }

        Node::List(parts).serialize(dialect)
    }

    /// The rendered SQL text (debugging helper).
    pub fn to_sql(&self, dialect: &Dialect) -> String {
        self.render(dialect).text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{col, eq, gt, val};

    fn d() -> Dialect {
        Dialect::default()
    }

    #[test]
    fn bare_select() {
        let q = Select::new().from("u", "users").unwrap();
        assert_eq!(q.to_sql(&d()), "SELECT * FROM \"users\" \"u\"");
    }

    #[test]
    fn select_with_where_and_fields() {
        let q = Select::new()
            .from("u", "users")
            .unwrap()
            .field_names(&["u.id", "u.email"])
            .unwrap()
            .filter(eq(col("u.active"), val(true)));
        let fragment = q.render(&d());
        assert_eq!(
            fragment.text,
            "SELECT \"u\".\"id\", \"u\".\"email\" FROM \"users\" \"u\" WHERE \"u\".\"active\" = ?"
        );
        assert_eq!(fragment.params.len(), 1);
    }

    #[test]
    fn repeated_filters_conjoin() {
        let q = Select::new()
            .from("u", "users")
            .unwrap()
            .filter(eq(col("u.active"), val(true)))
            .filter(gt(col("u.age"), val(18i32)));
        assert_eq!(
            q.to_sql(&d()),
            "SELECT * FROM \"users\" \"u\" WHERE \"u\".\"active\" = ? AND \"u\".\"age\" > ?"
        );
    }

    #[test]
    fn duplicate_alias_is_rejected() {
        let q = Select::new().from("u", "users").unwrap();
        let err = q
            .join("u", "orders", JoinKind::Inner, Some(col("x")))
            .unwrap_err();
        assert!(matches!(err, SqlError::DuplicateAlias(a) if a == "u"));
    }

    #[test]
    fn first_join_must_lead() {
        let err = Select::new()
            .join("o", "orders", JoinKind::Inner, Some(col("x")))
            .unwrap_err();
        assert!(matches!(err, SqlError::Structural(_)));
        assert!(Select::new().cross_join("o", "orders").is_ok());
        assert!(Select::new().from("o", "orders").is_ok());
    }

    #[test]
    fn left_join_renders_keyword_and_on() {
        let q = Select::new()
            .from("u", "users")
            .unwrap()
            .left_join("o", "orders", eq(col("u.id"), col("o.user_id")))
            .unwrap();
        assert_eq!(
            q.to_sql(&d()),
            "SELECT * FROM \"users\" \"u\" LEFT JOIN \"orders\" \"o\" \
             ON \"u\".\"id\" = \"o\".\"user_id\""
        );
    }

    #[test]
    fn comma_join_renders_comma() {
        let q = Select::new()
            .from("u", "users")
            .unwrap()
            .from("o", "orders")
            .unwrap();
        assert_eq!(
            q.to_sql(&d()),
            "SELECT * FROM \"users\" \"u\", \"orders\" \"o\""
        );
    }

    #[test]
    fn cross_join_drops_on_clause() {
        let q = Select::new()
            .from("u", "users")
            .unwrap()
            .join("o", "orders", JoinKind::Cross, Some(eq(col("u.id"), col("o.user_id"))))
            .unwrap();
        assert_eq!(
            q.to_sql(&d()),
            "SELECT * FROM \"users\" \"u\" CROSS JOIN \"orders\" \"o\""
        );
    }

    #[test]
    fn duplicate_limit_keeps_original_usable() {
        let q = Select::new().from("u", "users").unwrap().limit(10).unwrap();
        let err = q.limit(20).unwrap_err();
        assert!(matches!(err, SqlError::DuplicateClause("limit")));
        // The first descriptor is untouched and still renders.
        assert_eq!(q.to_sql(&d()), "SELECT * FROM \"users\" \"u\" LIMIT 10");
    }

    #[test]
    fn negative_limit_is_invalid() {
        let err = Select::new().limit(-1).unwrap_err();
        assert!(matches!(err, SqlError::InvalidArgument(_)));
    }

    #[test]
    fn offset_without_limit_gets_max_limit() {
        let q = Select::new().from("u", "users").unwrap().offset(40).unwrap();
        assert_eq!(
            q.to_sql(&d()),
            format!("SELECT * FROM \"users\" \"u\" LIMIT {} OFFSET 40", i64::MAX)
        );
    }

    #[test]
    fn order_by_is_reverse_insertion() {
        let q = Select::new()
            .from("u", "users")
            .unwrap()
            .order_by(col("u.name"), Direction::Asc)
            .order_by(col("u.created_at"), Direction::Desc);
        assert_eq!(
            q.to_sql(&d()),
            "SELECT * FROM \"users\" \"u\" ORDER BY \"u\".\"created_at\" DESC, \"u\".\"name\" ASC"
        );
    }

    #[test]
    fn order_without_direction_omits_keyword() {
        let q = Select::new()
            .from("u", "users")
            .unwrap()
            .order_by(col("u.id"), Direction::Unset);
        assert_eq!(q.to_sql(&d()), "SELECT * FROM \"users\" \"u\" ORDER BY \"u\".\"id\"");
    }

    #[test]
    fn group_normalizes_single_key() {
        let q = Select::new()
            .from("o", "orders")
            .unwrap()
            .group(col("o.user_id"))
            .unwrap();
        assert_eq!(
            q.to_sql(&d()),
            "SELECT * FROM \"orders\" \"o\" GROUP BY \"o\".\"user_id\""
        );
        assert!(q.group(col("o.status")).unwrap_err().is_duplicate_clause());
    }

    #[test]
    fn group_accepts_parenthesized_key_list() {
        let keys = Node::group([col("o.user_id"), Node::raw(","), col("o.status")]);
        let q = Select::new()
            .from("o", "orders")
            .unwrap()
            .group(keys)
            .unwrap();
        assert_eq!(
            q.to_sql(&d()),
            "SELECT * FROM \"orders\" \"o\" GROUP BY \"o\".\"user_id\", \"o\".\"status\""
        );
    }

    #[test]
    fn modifier_set_once() {
        let q = Select::new()
            .from("u", "users")
            .unwrap()
            .modifier(Modifier::Distinct)
            .unwrap();
        assert_eq!(q.to_sql(&d()), "SELECT DISTINCT * FROM \"users\" \"u\"");
        assert!(q.modifier(Modifier::All).unwrap_err().is_duplicate_clause());
    }

    #[test]
    fn having_renders_after_group() {
        let q = Select::new()
            .from("o", "orders")
            .unwrap()
            .fields([("user_id", col("o.user_id")), ("n", Node::raw("COUNT(*)"))])
            .unwrap()
            .group(col("o.user_id"))
            .unwrap()
            .having(gt(Node::raw("COUNT(*)"), val(5i64)));
        assert_eq!(
            q.to_sql(&d()),
            "SELECT \"o\".\"user_id\", COUNT(*) AS \"n\" FROM \"orders\" \"o\" \
             GROUP BY \"o\".\"user_id\" HAVING COUNT(*) > ?"
        );
    }

    #[test]
    fn aliased_field_emits_as() {
        let q = Select::new()
            .from("u", "users")
            .unwrap()
            .fields([("owner", col("u.name"))])
            .unwrap();
        assert_eq!(
            q.to_sql(&d()),
            "SELECT \"u\".\"name\" AS \"owner\" FROM \"users\" \"u\""
        );
    }

    #[test]
    fn subquery_relation() {
        let inner = Select::new().from("o", "orders").unwrap();
        let q = Select::new().from_subquery("t", inner).unwrap();
        assert_eq!(
            q.to_sql(&d()),
            "SELECT * FROM (SELECT * FROM \"orders\" \"o\") \"t\""
        );
    }
}
