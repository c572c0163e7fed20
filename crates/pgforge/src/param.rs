//! Parameter storage using Arc for clone-friendly statement values.

use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// A clone-friendly bind value wrapper using Arc.
///
/// Descriptors are immutable values that get cloned on every builder call,
/// so parameter payloads are shared rather than copied.
#[derive(Clone)]
pub struct Param(pub(crate) Arc<dyn ToSql + Send + Sync>);

impl Param {
    /// Create a new parameter from any ToSql value.
    pub fn new<T: ToSql + Send + Sync + 'static>(value: T) -> Self {
        Param(Arc::new(value))
    }

    /// A parameter holding SQL NULL.
    ///
    /// An absent value still occupies a placeholder, it never collapses to
    /// empty SQL text.
    pub fn null() -> Self {
        Param(Arc::new(Option::<String>::None))
    }

    /// Get a reference to the inner value as a ToSql trait object.
    pub fn as_ref(&self) -> &(dyn ToSql + Sync) {
        &*self.0 as &(dyn ToSql + Sync)
    }
}

impl std::fmt::Debug for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Param").field(&"<dyn ToSql>").finish()
    }
}

/// A tagged group of per-row bind values destined to become one batched
/// parameter.
///
/// The serializer never flattens a batch group into its rows; it travels as a
/// single parameter until the execution layer replays the statement once per
/// row (see [`crate::Fragment::execute_batch`]).
#[derive(Clone, Debug, Default)]
pub struct BatchGroup {
    rows: Vec<Vec<Param>>,
}

impl BatchGroup {
    /// Create an empty batch group.
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Create a batch group from pre-built rows.
    pub fn from_rows(rows: Vec<Vec<Param>>) -> Self {
        Self { rows }
    }

    /// Append one row of bind values.
    pub fn push_row(&mut self, row: Vec<Param>) {
        self.rows.push(row);
    }

    /// All rows in insertion order.
    pub fn rows(&self) -> &[Vec<Param>] {
        &self.rows
    }

    /// Number of rows in the group.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the group has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Bind-value count per row, if the group is non-empty and uniform.
    ///
    /// Returns `None` for an empty group or when rows disagree on arity.
    pub fn width(&self) -> Option<usize> {
        let first = self.rows.first()?.len();
        self.rows
            .iter()
            .all(|row| row.len() == first)
            .then_some(first)
    }
}

/// One entry in a [`crate::Fragment`]'s ordered parameter list.
#[derive(Clone, Debug)]
pub enum BindValue {
    /// An ordinary scalar bound at its placeholder.
    Value(Param),
    /// A batch group expanded by the execution layer, one run per row.
    Batch(BatchGroup),
}

impl BindValue {
    /// The scalar parameter, if this entry is not a batch group.
    pub fn as_param(&self) -> Option<&Param> {
        match self {
            BindValue::Value(p) => Some(p),
            BindValue::Batch(_) => None,
        }
    }

    /// Check if this entry is a batch group.
    pub fn is_batch(&self) -> bool {
        matches!(self, BindValue::Batch(_))
    }
}
