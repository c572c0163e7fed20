//! Predicate constructors for WHERE/HAVING/ON clauses.
//!
//! These helpers build [`Node`] trees; the builder itself accepts any
//! serializable node, so callers are free to assemble predicates by hand or
//! through richer front ends.
//!
//! ```ignore
//! use pgforge::expr::{and, col, eq, gt, val};
//!
//! let predicate = and(vec![
//!     eq(col("u.active"), val(true)),
//!     gt(col("u.age"), val(18i32)),
//! ]);
//! ```

use crate::fragment::Node;
use crate::param::Param;
use tokio_postgres::types::ToSql;

/// A column reference, quoted per the active dialect at render time.
pub fn col(name: impl Into<String>) -> Node {
    Node::name(name)
}

/// A bind-parameter operand.
pub fn val<T: ToSql + Send + Sync + 'static>(value: T) -> Node {
    Node::value(value)
}

/// A raw SQL operand emitted verbatim.
pub fn raw(text: impl Into<String>) -> Node {
    Node::raw(text)
}

fn cmp(left: Node, op: &str, right: Node) -> Node {
    Node::list([left, Node::raw(op), right])
}

/// left = right
pub fn eq(left: Node, right: Node) -> Node {
    cmp(left, "=", right)
}

/// left != right
pub fn ne(left: Node, right: Node) -> Node {
    cmp(left, "!=", right)
}

/// left > right
pub fn gt(left: Node, right: Node) -> Node {
    cmp(left, ">", right)
}

/// left >= right
pub fn gte(left: Node, right: Node) -> Node {
    cmp(left, ">=", right)
}

/// left < right
pub fn lt(left: Node, right: Node) -> Node {
    cmp(left, "<", right)
}

/// left <= right
pub fn lte(left: Node, right: Node) -> Node {
    cmp(left, "<=", right)
}

/// column LIKE pattern
pub fn like(left: Node, pattern: Node) -> Node {
    cmp(left, "LIKE", pattern)
}

/// column IS NULL
pub fn is_null(column: Node) -> Node {
    Node::list([column, Node::raw("IS NULL")])
}

/// column IS NOT NULL
pub fn is_not_null(column: Node) -> Node {
    Node::list([column, Node::raw("IS NOT NULL")])
}

/// column IN (v1, v2, ...)
pub fn in_list<T: ToSql + Send + Sync + 'static>(column: Node, values: Vec<T>) -> Node {
    let items = values.into_iter().map(|v| Node::Value(Param::new(v)));
    Node::list([
        column,
        Node::raw("IN"),
        Node::Group(Node::separated_items(items, ",")),
    ])
}

/// All conditions joined with AND.
pub fn and(exprs: Vec<Node>) -> Node {
    Node::separated(exprs, "AND")
}

/// Any condition, joined with OR and parenthesized so it composes under AND.
pub fn or(exprs: Vec<Node>) -> Node {
    Node::Group(Node::separated_items(exprs, "OR"))
}

/// NOT (inner)
pub fn not(inner: Node) -> Node {
    Node::list([Node::raw("NOT"), Node::Group(vec![inner])])
}
