use serde_json::{Number, Value};

use super::error::SqlError;
use super::types::{quote_identifier, FilterOp, ParamList};
use crate::dispatch::QueryFilter;
use crate::spec::{FieldDescriptor, ResourceDefinition};

/// Builds the WHERE predicate for a query's filters.
pub struct FilterWhere;

impl FilterWhere {
    /// Conditions joined with AND; empty when there are no filters.
    pub fn generate(
        api: &ResourceDefinition,
        filters: &[QueryFilter],
        params: &mut ParamList,
    ) -> Result<String, SqlError> {
        let conditions = filters
            .iter()
            .map(|filter| Self::build_condition(api, filter, params))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(conditions.join(" AND "))
    }

    fn build_condition(
        api: &ResourceDefinition,
        filter: &QueryFilter,
        params: &mut ParamList,
    ) -> Result<String, SqlError> {
        let operator = FilterOp::parse(&filter.op)?;
        let column = api.column_for(&filter.field);
        let quoted = quote_identifier(column)
            .ok_or_else(|| SqlError::InvalidColumn(column.to_string()))?;
        let field = api.field(&filter.field);

        match operator {
            FilterOp::In => {
                let placeholders = filter
                    .val
                    .split(',')
                    .map(|raw| coerce(field, &filter.field, raw.trim()).map(|v| params.push(v)))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("{} IN ({})", quoted, placeholders.join(", ")))
            }
            FilterOp::Like | FilterOp::ILike => {
                // Pattern operators always compare text
                let placeholder = params.push(Value::String(filter.val.clone()));
                Ok(format!("{}::text {} {}", quoted, operator.to_sql(), placeholder))
            }
            _ => {
                let placeholder = params.push(coerce(field, &filter.field, &filter.val)?);
                Ok(format!("{} {} {}", quoted, operator.to_sql(), placeholder))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeHint {
    Integer,
    Float,
    Boolean,
    Text,
    Other,
}

fn type_hint(field: Option<&FieldDescriptor>) -> Option<TypeHint> {
    let hint = field.and_then(FieldDescriptor::type_hint)?.to_ascii_lowercase();
    Some(match hint.as_str() {
        "integer" | "int" | "bigint" | "smallint" => TypeHint::Integer,
        "number" | "float" | "double" | "decimal" | "numeric" | "real" => TypeHint::Float,
        "boolean" | "bool" => TypeHint::Boolean,
        "string" | "text" | "varchar" | "char" => TypeHint::Text,
        _ => TypeHint::Other,
    })
}

/// Turn a textual filter value into a typed bind parameter.
///
/// A declared `type` on the field decides. Without one, only values that
/// read back identically as an integer bind as numbers; everything else
/// (`007`, `1e3`, `9.5`) stays text.
pub fn coerce(field: Option<&FieldDescriptor>, key: &str, raw: &str) -> Result<Value, SqlError> {
    let invalid = || SqlError::InvalidValue {
        field: key.to_string(),
        value: raw.to_string(),
    };

    match type_hint(field) {
        Some(TypeHint::Integer) => raw.parse::<i64>().map(Value::from).map_err(|_| invalid()),
        Some(TypeHint::Float) => raw
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(invalid),
        Some(TypeHint::Boolean) => match raw {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(invalid()),
        },
        Some(TypeHint::Text | TypeHint::Other) => Ok(Value::String(raw.to_string())),
        None => Ok(raw
            .parse::<i64>()
            .ok()
            .filter(|i| i.to_string() == raw)
            .map(Value::from)
            .unwrap_or_else(|| Value::String(raw.to_string()))),
    }
}

/// Conform a payload value to the field's declared type.
///
/// Strings are read the same way as filter values; scalars headed for text
/// columns become strings. Nulls and undeclared types pass through untouched.
pub fn coerce_payload(
    field: Option<&FieldDescriptor>,
    key: &str,
    value: &Value,
) -> Result<Value, SqlError> {
    let hint = type_hint(field);
    match (hint, value) {
        (_, Value::Null) | (None, _) => Ok(value.clone()),
        (Some(_), Value::String(raw)) => coerce(field, key, raw),
        (Some(TypeHint::Text), Value::Number(_) | Value::Bool(_)) => {
            Ok(Value::String(value.to_string()))
        }
        (Some(TypeHint::Integer), Value::Number(n)) => {
            n.as_i64().map(Value::from).ok_or_else(|| SqlError::InvalidValue {
                field: key.to_string(),
                value: n.to_string(),
            })
        }
        _ => Ok(value.clone()),
    }
}
