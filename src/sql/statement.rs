use serde_json::{Map, Value};

use super::error::SqlError;
use super::filter_where::{coerce_payload, FilterWhere};
use super::types::{quote_identifier, ParamList, SqlResult};
use crate::dispatch::Query;
use crate::spec::ID_FIELD;
use crate::types::Operation;

/// Translates a dispatched query into a single parameterized statement.
pub struct Statement;

impl Statement {
    pub fn build(query: &Query<'_>) -> Result<SqlResult, SqlError> {
        let table_name = query.api.table().unwrap_or(query.resource.as_str());
        let table = quote_identifier(table_name)
            .ok_or_else(|| SqlError::InvalidTableName(table_name.to_string()))?;

        let mut params = ParamList::new();
        let sql = match query.operation {
            Operation::Read => {
                let where_clause = FilterWhere::generate(query.api, &query.filters, &mut params)?;
                with_where(format!("SELECT * FROM {}", table), &where_clause)
            }
            Operation::Create => {
                let assignments = Self::assignments(query, &mut params, false)?;
                if assignments.is_empty() {
                    return Err(SqlError::EmptyPayload);
                }
                let (columns, placeholders): (Vec<_>, Vec<_>) = assignments.into_iter().unzip();
                format!(
                    "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
                    table,
                    columns.join(", "),
                    placeholders.join(", ")
                )
            }
            Operation::Update => {
                let assignments = Self::assignments(query, &mut params, true)?;
                if assignments.is_empty() {
                    return Err(SqlError::EmptyPayload);
                }
                let set_clause = assignments
                    .iter()
                    .map(|(column, placeholder)| format!("{} = {}", column, placeholder))
                    .collect::<Vec<_>>()
                    .join(", ");
                let where_clause = FilterWhere::generate(query.api, &query.filters, &mut params)?;
                if where_clause.is_empty() {
                    return Err(SqlError::UnscopedMutation("update"));
                }
                format!("UPDATE {} SET {} WHERE {} RETURNING *", table, set_clause, where_clause)
            }
            Operation::Delete => {
                let where_clause = FilterWhere::generate(query.api, &query.filters, &mut params)?;
                if where_clause.is_empty() {
                    return Err(SqlError::UnscopedMutation("delete"));
                }
                format!("DELETE FROM {} WHERE {} RETURNING *", table, where_clause)
            }
        };

        Ok(SqlResult {
            query: sql,
            params: params.into_values(),
        })
    }

    /// `(quoted column, placeholder)` pairs for declared fields present in the payload.
    fn assignments(
        query: &Query<'_>,
        params: &mut ParamList,
        skip_identifier: bool,
    ) -> Result<Vec<(String, String)>, SqlError> {
        let data: &Map<String, Value> = match &query.payload {
            Some(Value::Object(map)) => map,
            _ => return Err(SqlError::PayloadNotObject),
        };

        let mut assignments = Vec::new();
        for key in query.api.fields.keys() {
            if skip_identifier && key == ID_FIELD {
                continue;
            }
            let column = query.api.column_for(key);
            let Some(value) = data.get(column) else { continue };
            let quoted = quote_identifier(column)
                .ok_or_else(|| SqlError::InvalidColumn(column.to_string()))?;
            let value = coerce_payload(query.api.field(key), key, value)?;
            // An untyped NULL literal is accepted by columns of any type
            let placeholder = if value.is_null() {
                "NULL".to_string()
            } else {
                params.push(value)
            };
            assignments.push((quoted, placeholder));
        }
        Ok(assignments)
    }
}

fn with_where(sql: String, where_clause: &str) -> String {
    if where_clause.is_empty() {
        sql
    } else {
        format!("{} WHERE {}", sql, where_clause)
    }
}
