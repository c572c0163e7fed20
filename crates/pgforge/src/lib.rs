//! # pgforge
//!
//! A composable, parameter-safe SQL statement builder for PostgreSQL.
//!
//! ## Features
//!
//! - **Immutable descriptors**: `Select`/`Insert`/`Delete` are values; every
//!   builder call returns a new descriptor and the old one stays usable
//! - **One rendering pass**: a descriptor flattens into a [`Fragment`] — SQL
//!   text plus its ordered bind parameters, markers and values always in sync
//! - **Fail-fast building**: duplicate clauses, alias collisions, and join
//!   sequencing mistakes error at the offending call, not at execution
//! - **Batch groups**: multi-row parameter groups travel as one value and are
//!   expanded by the execution layer, one run per row
//! - **Explicit dialect**: identifier quoting is a value you pass in, not
//!   process-global state
//!
//! ## Building statements
//!
//! ```ignore
//! use pgforge::{stmt, Dialect};
//! use pgforge::expr::{col, eq, val};
//!
//! let query = stmt::select()
//!     .from("u", "users")?
//!     .inner_join("o", "orders", eq(col("u.id"), col("o.user_id")))?
//!     .fields([("id", col("u.id")), ("total", col("o.total"))])?
//!     .filter(eq(col("u.active"), val(true)))
//!     .limit(10)?;
//!
//! let fragment = query.render(&Dialect::default());
//! let users = fragment.query(&client).await?;
//! ```

pub mod client;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod fragment;
pub mod param;
pub mod row;
pub mod stmt;

pub use client::{GenericClient, exactly_one, single_value};
pub use dialect::{CaseFold, Dialect};
pub use error::{SqlError, SqlResult};
pub use fragment::{Fragment, Node};
pub use param::{BatchGroup, BindValue, Param};
pub use row::{FromRow, RowExt};
pub use stmt::{
    Delete, Direction, Insert, JoinKind, Modifier, Record, Select, TableRef, delete, insert,
    select,
};
