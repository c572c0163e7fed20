//! INSERT descriptor and builder.

use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};
use crate::fragment::{Fragment, Node};
use crate::param::{BatchGroup, Param};
use tokio_postgres::types::ToSql;

/// One row to insert: an ordered column-to-value map.
#[derive(Clone, Debug, Default)]
pub struct Record {
    entries: Vec<(String, Param)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    fn put(mut self, column: &str, param: Param) -> Self {
        match self.entries.iter_mut().find(|(name, _)| name == column) {
            Some(entry) => entry.1 = param,
            None => self.entries.push((column.to_string(), param)),
        }
        self
    }

    /// Set a column value, replacing any earlier value for the column.
    pub fn set<T: ToSql + Send + Sync + 'static>(self, column: &str, value: T) -> Self {
        self.put(column, Param::new(value))
    }

    /// Set a column to SQL NULL.
    pub fn set_null(self, column: &str) -> Self {
        self.put(column, Param::null())
    }

    /// Set a column to the JSON serialization of `value`.
    pub fn set_json<T: serde::Serialize>(self, column: &str, value: &T) -> serde_json::Result<Self> {
        let json = serde_json::to_value(value)?;
        Ok(self.set(column, json))
    }

    /// Look up a column's value.
    pub fn get(&self, column: &str) -> Option<&Param> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, param)| param)
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

/// An immutable INSERT statement descriptor.
///
/// Records accumulate by appending; the column list is either set explicitly
/// (once) or inferred at render time as the first-appearance-order union of
/// all record keys.
#[derive(Clone, Debug)]
pub struct Insert {
    table: String,
    fields: Option<Vec<String>>,
    records: Vec<Record>,
}

impl Insert {
    /// Create a descriptor targeting `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            fields: None,
            records: Vec::new(),
        }
    }

    /// Set the explicit column list. Settable once.
    pub fn fields(&self, columns: &[&str]) -> SqlResult<Insert> {
        if self.fields.is_some() {
            return Err(SqlError::DuplicateClause("fields"));
        }
        let mut next = self.clone();
        next.fields = Some(columns.iter().map(|c| c.to_string()).collect());
        Ok(next)
    }

    /// Append one record.
    pub fn values(&self, record: Record) -> Insert {
        let mut next = self.clone();
        next.records.push(record);
        next
    }

    /// Append many records.
    pub fn values_many(&self, records: impl IntoIterator<Item = Record>) -> Insert {
        let mut next = self.clone();
        next.records.extend(records);
        next
    }

    /// The effective column list: explicit fields, or the union of record
    /// keys in first-appearance order.
    fn column_list(&self) -> Vec<String> {
        if let Some(fields) = &self.fields {
            return fields.clone();
        }
        let mut columns: Vec<String> = Vec::new();
        for record in &self.records {
            for column in record.columns() {
                if !columns.iter().any(|c| c == column) {
                    columns.push(column.to_string());
                }
            }
        }
        columns
    }

    fn row_params(record: &Record, columns: &[String]) -> Vec<Param> {
        columns
            .iter()
            .map(|column| record.get(column).cloned().unwrap_or_else(Param::null))
            .collect()
    }

    fn header(&self, columns: &[String]) -> Vec<Node> {
        let mut parts = vec![Node::raw("INSERT INTO"), Node::name(self.table.clone())];
        if !columns.is_empty() {
            parts.push(Node::Group(Node::separated_items(
                columns.iter().map(|c| Node::name(c.clone())),
                ",",
            )));
        }
        parts
    }

    /// Render into one [`Fragment`] with one VALUES group per record.
    ///
    /// Columns a record lacks are bound as NULL parameters.
    pub fn render(&self, dialect: &Dialect) -> Fragment {
        let columns = self.column_list();
        if self.records.is_empty() || columns.is_empty() {
            let mut parts = vec![Node::raw("INSERT INTO"), Node::name(self.table.clone())];
            parts.push(Node::raw("DEFAULT VALUES"));
            return Node::List(parts).serialize(dialect);
        }

        let mut parts = self.header(&columns);
        parts.push(Node::raw("VALUES"));
        parts.push(Node::separated(
            self.records.iter().map(|record| {
                Node::Group(Node::separated_items(
                    Self::row_params(record, &columns)
                        .into_iter()
                        .map(Node::Value),
                    ",",
                ))
            }),
            ",",
        ));
        Node::List(parts).serialize(dialect)
    }

    /// Render a single-row template whose one parameter is a [`BatchGroup`]
    /// of per-record rows; the execution layer replays it once per record.
    pub fn render_batch(&self, dialect: &Dialect) -> SqlResult<Fragment> {
        let columns = self.column_list();
        if self.records.is_empty() || columns.is_empty() {
            return Err(SqlError::invalid_argument(
                "batch insert requires at least one record with columns",
            ));
        }
        let rows = self
            .records
            .iter()
            .map(|record| Self::row_params(record, &columns))
            .collect::<Vec<_>>();
        let mut parts = self.header(&columns);
        parts.push(Node::raw("VALUES"));
        parts.push(Node::Group(vec![Node::Batch(BatchGroup::from_rows(rows))]));
        Ok(Node::List(parts).serialize(dialect))
    }

    /// The rendered SQL text (debugging helper).
    pub fn to_sql(&self, dialect: &Dialect) -> String {
        self.render(dialect).text
    }
}
