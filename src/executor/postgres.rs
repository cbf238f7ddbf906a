use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Number, Value};
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::types::chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::types::{BigDecimal, Uuid};
use sqlx::{Column, PgPool, Postgres, Row, TypeInfo};
use tracing::{debug, info, warn};

use super::{DataExecutor, ExecutionError};
use crate::config::DatabaseConfig;
use crate::dispatch::Query;
use crate::sql::Statement;

/// Executes dispatched queries against PostgreSQL.
pub struct PgExecutor {
    pool: PgPool,
}

impl PgExecutor {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, ExecutionError> {
        let url = config
            .url
            .as_deref()
            .ok_or(ExecutionError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .connect(url)
            .await?;

        info!(
            "Created database pool (max_connections={})",
            config.max_connections
        );
        Ok(Self { pool })
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), ExecutionError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl DataExecutor for PgExecutor {
    async fn execute(&self, query: &Query<'_>) -> Result<Value, ExecutionError> {
        let statement = Statement::build(query)?;
        debug!(
            "Executing on '{}': {} ({} params)",
            query.resource,
            statement.query,
            statement.params.len()
        );

        let mut q = sqlx::query(&statement.query);
        for p in statement.params.iter() {
            q = bind_param(q, p);
        }
        let rows = q.fetch_all(&self.pool).await?;

        let records = rows.iter().map(row_to_json).collect::<Result<Vec<_>, _>>()?;
        Ok(Value::Array(records))
    }
}

fn bind_param<'q>(
    q: sqlx::query::Query<'q, Postgres, PgArguments>,
    v: &Value,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.clone()),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()),
    }
}

fn row_to_json(row: &PgRow) -> Result<Value, ExecutionError> {
    let mut map = Map::new();
    for column in row.columns() {
        let value = column_value(row, column.ordinal(), column.type_info().name())?;
        map.insert(column.name().to_string(), value);
    }
    Ok(Value::Object(map))
}

/// Decode one column, picking the Rust type from the PostgreSQL type name.
fn column_value(row: &PgRow, index: usize, type_name: &str) -> Result<Value, sqlx::Error> {
    let value = match type_name {
        "BOOL" => decode(row, index, Value::Bool)?,
        "INT2" => decode(row, index, |n: i16| Value::from(n))?,
        "INT4" => decode(row, index, |n: i32| Value::from(n))?,
        "INT8" => decode(row, index, |n: i64| Value::from(n))?,
        "FLOAT4" => decode(row, index, |f: f32| float(f as f64))?,
        "FLOAT8" => decode(row, index, float)?,
        "NUMERIC" => decode(row, index, numeric)?,
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => decode(row, index, Value::String)?,
        "UUID" => decode(row, index, |u: Uuid| Value::String(u.to_string()))?,
        "DATE" => decode(row, index, |d: NaiveDate| Value::String(d.to_string()))?,
        "TIME" => decode(row, index, |t: NaiveTime| Value::String(t.to_string()))?,
        "TIMESTAMP" => decode(row, index, |t: NaiveDateTime| {
            Value::String(t.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
        })?,
        "TIMESTAMPTZ" => decode(row, index, |t: DateTime<Utc>| Value::String(t.to_rfc3339()))?,
        "JSON" | "JSONB" => decode(row, index, |v: Value| v)?,
        _ => match row.try_get::<Option<String>, _>(index) {
            Ok(text) => text.map(Value::String).unwrap_or(Value::Null),
            Err(_) => {
                warn!("Unhandled PostgreSQL type {}, returning null", type_name);
                Value::Null
            }
        },
    };
    Ok(value)
}

fn decode<'r, T>(row: &'r PgRow, index: usize, convert: impl FnOnce(T) -> Value) -> Result<Value, sqlx::Error>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    Ok(row
        .try_get::<Option<T>, _>(index)?
        .map(convert)
        .unwrap_or(Value::Null))
}

/// NUMERIC as a JSON number when an f64 holds it exactly, otherwise as its decimal text.
fn numeric(d: BigDecimal) -> Value {
    let text = d.to_string();
    let significant = text.chars().filter(char::is_ascii_digit).count();
    if significant <= 15 {
        if let Ok(n) = text.parse::<Number>() {
            return Value::Number(n);
        }
    }
    Value::String(text)
}

fn float(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decimal(text: &str) -> BigDecimal {
        text.parse().unwrap()
    }

    #[test]
    fn numerics_become_numbers_when_exact() {
        assert_eq!(numeric(decimal("12.50")), json!(12.5));
        assert_eq!(numeric(decimal("-3")), json!(-3));
        assert_eq!(
            numeric(decimal("123456789012345678901234567890")),
            json!("123456789012345678901234567890")
        );
    }

    #[test]
    fn non_finite_floats_are_null() {
        assert_eq!(float(f64::NAN), Value::Null);
        assert_eq!(float(0.25), json!(0.25));
    }
}
