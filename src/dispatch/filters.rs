//! Per-operation validation run after the query has been assembled.
//!
//! Each routine either accepts the query (possibly adding filters) or rejects
//! it with a human-readable reason.

use serde_json::Value;

use crate::dispatch::error::DispatchError;
use crate::dispatch::query::{Query, QueryFilter, DEFAULT_OP};
use crate::spec::ID_FIELD;
use crate::types::Operation;

pub fn apply(query: &mut Query<'_>, params: &[(String, String)]) -> Result<(), DispatchError> {
    match query.operation {
        Operation::Create => before_create(query),
        Operation::Read => before_read(query, params),
        Operation::Update => before_update(query),
        Operation::Delete => before_delete(query),
    }
}

fn before_create(query: &Query<'_>) -> Result<(), DispatchError> {
    let data = match &query.payload {
        Some(data) if !data.is_null() => data,
        _ => return Err(DispatchError::validation("json payload is required")),
    };

    let missing = query
        .api
        .fields
        .iter()
        .filter(|(key, field)| field.is_required && key.as_str() != ID_FIELD)
        .find(|(_, field)| is_blank(data.get(field.name.as_str())));

    match missing {
        Some((key, _)) => Err(DispatchError::validation(format!(
            "{} is a required param",
            key
        ))),
        None => Ok(()),
    }
}

/// Query parameters naming a declared field become filters; everything else is ignored.
fn before_read(query: &mut Query<'_>, params: &[(String, String)]) -> Result<(), DispatchError> {
    for (key, value) in params {
        if !query.api.has_field(key) {
            continue;
        }
        query.filters.push(parse_param_filter(key, value));
    }
    Ok(())
}

fn before_update(query: &Query<'_>) -> Result<(), DispatchError> {
    if query.id_filter().is_none() {
        return Err(DispatchError::validation("id is a required parameter"));
    }
    if query.payload.as_ref().map_or(true, is_empty_payload) {
        return Err(DispatchError::validation("no data to update"));
    }
    Ok(())
}

fn before_delete(_query: &Query<'_>) -> Result<(), DispatchError> {
    Ok(())
}

/// `gt=30` splits into op `gt` and val `30`; a value without `=` is an equality.
pub fn parse_param_filter(field: &str, value: &str) -> QueryFilter {
    match value.split_once('=') {
        Some((op, val)) if !op.is_empty() => QueryFilter::new(field, op, val),
        Some((_, val)) => QueryFilter::new(field, DEFAULT_OP, val),
        None => QueryFilter::new(field, DEFAULT_OP, value),
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
