use serde::Serialize;
use serde_json::Value;

use crate::dispatch::resolver::Resolution;
use crate::spec::ResourceDefinition;
use crate::types::Operation;

/// Operator used when a filter does not name one.
pub const DEFAULT_OP: &str = "eq";

/// A `{field, op, val}` constraint handed to the data executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryFilter {
    pub field: String,
    pub op: String,
    pub val: String,
}

impl QueryFilter {
    pub fn new(field: impl Into<String>, op: impl Into<String>, val: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op: op.into(),
            val: val.into(),
        }
    }

    pub fn eq(field: impl Into<String>, val: impl Into<String>) -> Self {
        Self::new(field, DEFAULT_OP, val)
    }
}

/// Caller identity attached to queries against protected resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthContext {
    pub token: String,
    pub device: String,
}

/// Request-scoped aggregate handed verbatim to the data executor.
#[derive(Debug, Clone, Serialize)]
pub struct Query<'s> {
    /// Path key under which `api` was found
    pub resource: String,
    pub api: &'s ResourceDefinition,
    pub operation: Operation,
    /// Path-derived filters first, then query-parameter filters
    pub filters: Vec<QueryFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthContext>,
}

impl<'s> Query<'s> {
    /// Aggregate the outputs of the earlier stages. No validation happens here.
    pub fn assemble(
        resolution: Resolution<'s>,
        operation: Operation,
        payload: Option<Value>,
        auth: Option<AuthContext>,
    ) -> Self {
        Self {
            resource: resolution.resource,
            api: resolution.api,
            operation,
            filters: resolution.filters,
            payload,
            auth,
        }
    }

    pub fn id_filter(&self) -> Option<&QueryFilter> {
        self.filters
            .iter()
            .find(|f| f.field == crate::spec::ID_FIELD && !f.val.is_empty())
    }
}
