pub mod postgres;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::dispatch::Query;
use crate::sql::SqlError;

pub use postgres::PgExecutor;

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error(transparent)]
    Statement(#[from] SqlError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    /// Rejection raised by an executor for its own reasons
    #[error("{0}")]
    Rejected(String),
}

/// Backend that runs a completed query and returns its rows.
#[async_trait]
pub trait DataExecutor: Send + Sync {
    async fn execute(&self, query: &Query<'_>) -> Result<Value, ExecutionError>;
}
