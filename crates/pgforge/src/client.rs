//! Execution boundary: running rendered fragments over tokio-postgres.
//!
//! The core emits positional `?` markers; this layer renumbers them into
//! Postgres `$n` placeholders, expands batch-parameter groups into one
//! execution per row, and enforces strict row cardinality where the caller
//! asked for exactly one row.

use crate::error::{SqlError, SqlResult};
use crate::fragment::Fragment;
use crate::param::BindValue;
use crate::row::FromRow;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use tracing::debug;

/// A trait that unifies database clients and transactions.
///
/// Statements accept either a direct connection or a transaction, so the
/// same descriptor code composes into transactional flows unchanged.
pub trait GenericClient: Send + Sync {
    /// Execute a query and return all rows.
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = SqlResult<Vec<Row>>> + Send;

    /// Execute a statement and return the affected row count.
    fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = SqlResult<u64>> + Send;
}

impl GenericClient for tokio_postgres::Client {
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = SqlResult<Vec<Row>>> + Send {
        async move { Ok(tokio_postgres::Client::query(self, sql, params).await?) }
    }

    fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = SqlResult<u64>> + Send {
        async move { Ok(tokio_postgres::Client::execute(self, sql, params).await?) }
    }
}

impl GenericClient for tokio_postgres::Transaction<'_> {
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = SqlResult<Vec<Row>>> + Send {
        async move { Ok(tokio_postgres::Transaction::query(self, sql, params).await?) }
    }

    fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = SqlResult<u64>> + Send {
        async move { Ok(tokio_postgres::Transaction::execute(self, sql, params).await?) }
    }
}

/// Renumber positional `?` markers into `$1, $2, ...` placeholders.
pub(crate) fn number_placeholders(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut index = 0usize;
    for ch in text.chars() {
        if ch == '?' {
            index += 1;
            out.push('$');
            out.push_str(&index.to_string());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Replace the `marker_index`-th `?` (0-based) with `width` comma-joined
/// markers, widening a batch slot to one row's arity.
pub(crate) fn widen_marker(text: &str, marker_index: usize, width: usize) -> String {
    let mut out = String::with_capacity(text.len() + width * 3);
    let mut seen = 0usize;
    for ch in text.chars() {
        if ch == '?' {
            if seen == marker_index {
                for i in 0..width {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push('?');
                }
            } else {
                out.push('?');
            }
            seen += 1;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Require exactly one element, surfacing any other count as a
/// [`SqlError::Cardinality`] instead of silently truncating.
pub fn exactly_one<T>(items: Vec<T>) -> SqlResult<T> {
    match items.len() {
        1 => Ok(items.into_iter().next().expect("len == 1")),
        got => Err(SqlError::cardinality(1, got)),
    }
}

/// Read the single value of a single-column row.
///
/// A row with any other column count is a [`SqlError::Cardinality`].
pub fn single_value<'a, T>(row: &'a Row) -> SqlResult<T>
where
    T: tokio_postgres::types::FromSql<'a>,
{
    if row.len() != 1 {
        return Err(SqlError::cardinality(1, row.len()));
    }
    row.try_get(0)
        .map_err(|e| SqlError::decode(row.columns()[0].name(), e.to_string()))
}

impl Fragment {
    /// Scalar parameter references in bind order.
    ///
    /// Fails when a batch group is present; those only run through
    /// [`Fragment::execute_batch`].
    fn scalar_refs(&self) -> SqlResult<Vec<&(dyn ToSql + Sync)>> {
        self.params
            .iter()
            .map(|entry| match entry {
                BindValue::Value(param) => Ok(param.as_ref()),
                BindValue::Batch(_) => Err(SqlError::invalid_argument(
                    "batch parameter group requires execute_batch",
                )),
            })
            .collect()
    }

    /// The driver-ready statement text with `$n` placeholders.
    pub fn to_postgres_sql(&self) -> String {
        number_placeholders(&self.text)
    }

    /// Execute and return all rows.
    pub async fn query(&self, conn: &impl GenericClient) -> SqlResult<Vec<Row>> {
        let params = self.scalar_refs()?;
        let sql = self.to_postgres_sql();
        debug!(sql = %sql, params = params.len(), "executing query");
        conn.query(&sql, &params).await
    }

    /// Execute and return at most one row; a second row is a cardinality
    /// error.
    pub async fn query_opt(&self, conn: &impl GenericClient) -> SqlResult<Option<Row>> {
        let mut rows = self.query(conn).await?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(Some(rows.remove(0))),
            got => Err(SqlError::cardinality(1, got)),
        }
    }

    /// Execute and require exactly one row.
    pub async fn query_one(&self, conn: &impl GenericClient) -> SqlResult<Row> {
        exactly_one(self.query(conn).await?)
    }

    /// Execute and return the affected row count.
    pub async fn execute(&self, conn: &impl GenericClient) -> SqlResult<u64> {
        let params = self.scalar_refs()?;
        let sql = self.to_postgres_sql();
        debug!(sql = %sql, params = params.len(), "executing statement");
        conn.execute(&sql, &params).await
    }

    /// Execute and map all rows to `T`.
    pub async fn fetch_all<T: FromRow>(&self, conn: &impl GenericClient) -> SqlResult<Vec<T>> {
        let rows = self.query(conn).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute and map exactly one row to `T`.
    pub async fn fetch_one<T: FromRow>(&self, conn: &impl GenericClient) -> SqlResult<T> {
        let row = self.query_one(conn).await?;
        T::from_row(&row)
    }

    /// Execute and map at most one row to `T`.
    pub async fn fetch_opt<T: FromRow>(&self, conn: &impl GenericClient) -> SqlResult<Option<T>> {
        let row = self.query_opt(conn).await?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Expand this fragment's batch-parameter group and run the statement
    /// once per row, returning the summed affected count.
    ///
    /// The fragment must carry exactly one batch group, all of whose rows
    /// agree on arity; scalar parameters around the group are re-bound on
    /// every execution.
    pub async fn execute_batch(&self, conn: &impl GenericClient) -> SqlResult<u64> {
        let batch_positions: Vec<usize> = self
            .params
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.is_batch())
            .map(|(i, _)| i)
            .collect();
        let &[marker_index] = batch_positions.as_slice() else {
            return Err(SqlError::invalid_argument(format!(
                "execute_batch requires exactly one batch parameter group, found {}",
                batch_positions.len()
            )));
        };
        let BindValue::Batch(group) = &self.params[marker_index] else {
            unreachable!("position was filtered on is_batch");
        };
        let width = group.width().ok_or_else(|| {
            SqlError::invalid_argument("batch rows must be non-empty and agree on arity")
        })?;

        let sql = number_placeholders(&widen_marker(&self.text, marker_index, width));
        debug!(sql = %sql, rows = group.len(), "executing batch statement");

        let mut affected = 0u64;
        for row in group.rows() {
            let mut params: Vec<&(dyn ToSql + Sync)> = Vec::with_capacity(
                self.params.len() - 1 + width,
            );
            for (i, entry) in self.params.iter().enumerate() {
                match entry {
                    BindValue::Batch(_) if i == marker_index => {
                        params.extend(row.iter().map(|p| p.as_ref()));
                    }
                    BindValue::Value(param) => params.push(param.as_ref()),
                    BindValue::Batch(_) => unreachable!("only one batch group"),
                }
            }
            affected += conn.execute(&sql, &params).await?;
        }
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::fragment::Node;
    use crate::param::{BatchGroup, Param};

    #[test]
    fn number_placeholders_in_order() {
        assert_eq!(
            number_placeholders("a = ? AND b IN (?, ?)"),
            "a = $1 AND b IN ($2, $3)"
        );
    }

    #[test]
    fn number_placeholders_without_markers() {
        assert_eq!(number_placeholders("SELECT 1"), "SELECT 1");
    }

    #[test]
    fn widen_marker_targets_the_right_slot() {
        assert_eq!(widen_marker("? (?)", 1, 3), "? (?, ?, ?)");
        assert_eq!(widen_marker("(?)", 0, 1), "(?)");
    }

    #[test]
    fn exactly_one_accepts_single() {
        assert_eq!(exactly_one(vec![7]).unwrap(), 7);
    }

    #[test]
    fn exactly_one_rejects_zero_and_many() {
        let err = exactly_one(Vec::<i32>::new()).unwrap_err();
        assert!(matches!(err, SqlError::Cardinality { expected: 1, got: 0 }));
        let err = exactly_one(vec![1, 2]).unwrap_err();
        assert!(err.is_cardinality());
    }

    #[test]
    fn scalar_refs_reject_batch_groups() {
        let fragment = Node::list([
            Node::value(1i32),
            Node::Batch(BatchGroup::from_rows(vec![vec![Param::new(2i32)]])),
        ])
        .serialize(&Dialect::default());
        assert!(fragment.scalar_refs().is_err());
    }

    #[test]
    fn to_postgres_sql_renumbers() {
        let fragment = Node::list([
            Node::raw("SELECT * FROM t WHERE a ="),
            Node::value(1i32),
            Node::raw("AND b ="),
            Node::value(2i32),
        ])
        .serialize(&Dialect::default());
        assert_eq!(
            fragment.to_postgres_sql(),
            "SELECT * FROM t WHERE a = $1 AND b = $2"
        );
    }
}
