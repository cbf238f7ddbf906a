//! Parameterized PostgreSQL statements built from dispatched queries.

pub mod error;
pub mod filter_where;
pub mod statement;
pub mod types;

pub use error::SqlError;
pub use filter_where::FilterWhere;
pub use statement::Statement;
pub use types::{FilterOp, SqlResult};
