//! DELETE descriptor and builder.

use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};
use crate::fragment::{Fragment, Node};
use crate::stmt::{TableRef, conjoin};

/// An immutable DELETE statement descriptor.
#[derive(Clone, Debug)]
pub struct Delete {
    table: String,
    using: Vec<(String, TableRef)>,
    where_: Option<Node>,
}

impl Delete {
    /// Create a descriptor targeting `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            using: Vec::new(),
            where_: None,
        }
    }

    /// Attach an auxiliary relation for the USING clause.
    pub fn using(&self, alias: &str, table: &str) -> SqlResult<Delete> {
        if self.using.iter().any(|(existing, _)| existing == alias) {
            return Err(SqlError::DuplicateAlias(alias.to_string()));
        }
        let mut next = self.clone();
        next.using
            .push((alias.to_string(), TableRef::Name(table.to_string())));
        Ok(next)
    }

    /// Add a WHERE predicate; repeated calls conjoin with AND.
    pub fn filter(&self, expr: Node) -> Delete {
        let mut next = self.clone();
        next.where_ = conjoin(next.where_.take(), expr);
        next
    }

    /// Render into one [`Fragment`].
    pub fn render(&self, dialect: &Dialect) -> Fragment {
        let mut parts = vec![Node::raw("DELETE FROM"), Node::name(self.table.clone())];

        if !self.using.is_empty() {
            parts.push(Node::raw("USING"));
            parts.push(Node::separated(
                self.using
                    .iter()
                    .map(|(alias, table)| table.to_node(alias, dialect)),
                ",",
            ));
        }

        if let Some(where_) = &self.where_ {
            parts.push(Node::raw("WHERE"));
            parts.push(where_.clone());
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
    use crate::expr::{col, eq, lt, val};

    fn d() -> Dialect {
        Dialect::default()
    }

    #[test]
    fn bare_delete() {
        assert_eq!(Delete::new("users").to_sql(&d()), "DELETE FROM \"users\"");
    }

    #[test]
    fn delete_with_where() {
        let q = Delete::new("users").filter(eq(col("id"), val(1i64)));
        let fragment = q.render(&d());
        assert_eq!(fragment.text, "DELETE FROM \"users\" WHERE \"id\" = ?");
        assert_eq!(fragment.params.len(), 1);
    }

    #[test]
    fn repeated_filters_conjoin() {
        let q = Delete::new("users")
            .filter(eq(col("status"), val("inactive")))
            .filter(lt(col("last_login"), val("2024-01-01")));
        assert_eq!(
            q.to_sql(&d()),
            "DELETE FROM \"users\" WHERE \"status\" = ? AND \"last_login\" < ?"
        );
    }

    #[test]
    fn delete_with_using() {
        let q = Delete::new("orders")
            .using("u", "users")
            .unwrap()
            .filter(eq(col("orders.user_id"), col("u.id")));
        assert_eq!(
            q.to_sql(&d()),
            "DELETE FROM \"orders\" USING \"users\" \"u\" \
             WHERE \"orders\".\"user_id\" = \"u\".\"id\""
        );
    }

    #[test]
    fn duplicate_using_alias_is_rejected() {
        let q = Delete::new("orders").using("u", "users").unwrap();
        assert!(matches!(
            q.using("u", "accounts").unwrap_err(),
            SqlError::DuplicateAlias(_)
        ));
        // Original remains usable.
        assert!(q.to_sql(&d()).contains("USING \"users\" \"u\""));
    }
}
