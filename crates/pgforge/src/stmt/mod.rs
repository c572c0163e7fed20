//! Statement descriptors and their builders.
//!
//! `Select`, `Insert`, and `Delete` are immutable values: every builder
//! operation takes `&self` and returns a fresh descriptor, so a failed call
//! leaves the original untouched and reusable. Rendering walks the
//! accumulated clauses in canonical order and hands each one to the
//! serializer.
//!
//! ```ignore
//! use pgforge::{stmt, Dialect};
//! use pgforge::expr::{col, eq, val};
//!
//! let query = stmt::select()
//!     .from("u", "users")?
//!     .filter(eq(col("u.active"), val(true)))
//!     .limit(10)?;
//! let fragment = query.render(&Dialect::default());
//! ```

mod delete;
mod insert;
mod select;

pub use delete::Delete;
pub use insert::{Insert, Record};
pub use select::Select;

use crate::fragment::Node;

/// How a relation is attached to the statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinKind {
    /// Comma-attached relation (implicit cross product).
    None,
    /// CROSS JOIN; never carries an ON clause.
    Cross,
    /// INNER JOIN.
    Inner,
    /// LEFT JOIN.
    Left,
    /// RIGHT JOIN.
    Right,
    /// FULL OUTER JOIN.
    Full,
}

impl JoinKind {
    /// The join keyword, or `None` for comma attachment.
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            JoinKind::None => Option::None,
            JoinKind::Cross => Some("CROSS JOIN"),
            JoinKind::Inner => Some("INNER JOIN"),
            JoinKind::Left => Some("LEFT JOIN"),
            JoinKind::Right => Some("RIGHT JOIN"),
            JoinKind::Full => Some("FULL OUTER JOIN"),
        }
    }

    /// Whether this kind may open a statement's relation list.
    pub fn can_lead(self) -> bool {
        matches!(self, JoinKind::None | JoinKind::Cross)
    }
}

/// Sort direction for ORDER BY entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Direction {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
    /// No direction keyword emitted.
    #[default]
    Unset,
}

impl Direction {
    fn keyword(self) -> Option<&'static str> {
        match self {
            Direction::Asc => Some("ASC"),
            Direction::Desc => Some("DESC"),
            Direction::Unset => None,
        }
    }
}

/// SELECT row modifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Modifier {
    /// DISTINCT
    Distinct,
    /// ALL
    All,
}

impl Modifier {
    pub(crate) fn keyword(self) -> &'static str {
        match self {
            Modifier::Distinct => "DISTINCT",
            Modifier::All => "ALL",
        }
    }
}

/// A relation under an alias: a named table or a subquery.
#[derive(Clone, Debug)]
pub enum TableRef {
    /// A (possibly schema-qualified) table name.
    Name(String),
    /// A nested SELECT rendered in parentheses.
    Subquery(Box<Select>),
}

impl TableRef {
    pub(crate) fn to_node(&self, alias: &str, dialect: &crate::dialect::Dialect) -> Node {
        let relation = match self {
            TableRef::Name(name) => Node::name(name.clone()),
            TableRef::Subquery(select) => {
                Node::Group(vec![Node::Fragment(select.render(dialect))])
            }
        };
        Node::list([relation, Node::name(alias)])
    }
}

/// One entry in a statement's join sequence.
#[derive(Clone, Debug)]
pub(crate) struct Join {
    pub(crate) alias: String,
    pub(crate) kind: JoinKind,
    pub(crate) on: Option<Node>,
}

/// Conjoin a new predicate onto an optional existing one.
pub(crate) fn conjoin(existing: Option<Node>, expr: Node) -> Option<Node> {
    Some(match existing {
        None => expr,
        Some(prior) => Node::list([prior, Node::raw("AND"), expr]),
    })
}

/// Sort entry node: `expr [ASC|DESC]`.
pub(crate) fn order_entry(expr: &Node, dir: Direction) -> Node {
    match dir.keyword() {
        Some(keyword) => Node::list([expr.clone(), Node::raw(keyword)]),
        None => expr.clone(),
    }
}

/// Create a SELECT descriptor with no clauses.
pub fn select() -> Select {
    Select::new()
}

/// Create an INSERT descriptor for the given table.
pub fn insert(table: &str) -> Insert {
    Insert::new(table)
}

/// Create a DELETE descriptor for the given table.
pub fn delete(table: &str) -> Delete {
    Delete::new(table)
}
