//! # pggen
//!
//! Runtime support for the data access modules written by the `pggen`
//! generator: a small query DSL for filtering, ordering and paginating
//! `count`/`select` calls, and the value layer that binds parameters and
//! decodes Postgres rows.
//!
//! ```no_run
//! use pggen::{Direction, Filter, SelectOptions};
//!
//! let options = SelectOptions::new()
//!     .filter(Filter::ne("tier", "free"))
//!     .order_by(Direction::asc("name"))
//!     .limit(20);
//! let clause = pggen::select_clause(Some(&options)).unwrap();
//! assert_eq!(clause.values.len(), 1);
//! ```

pub mod error;
pub mod query;
pub mod value;

pub use error::{Error, QueryError, Result};
pub use query::{
    count_clause, limit_offset_clause, order_by_clause, quote_identifier, select_clause,
    where_clause, Clause, Direction, Filter, OrderDirection, SelectOptions, SelectResult,
};
pub use value::{bind_values, decode, row_count, FromColumn, SqlValue, ToSqlValue};
