use axum::http::Method;
use tracing::{debug, error};

use crate::dispatch::error::DispatchError;
use crate::spec::ResourceDefinition;
use crate::types::Operation;

/// Map the verb and confirm the resource declares the resulting operation.
///
/// Undeclared operations are reported as `NotFound`, indistinguishable from a
/// missing resource.
pub fn validate(method: &Method, api: &ResourceDefinition) -> Result<Operation, DispatchError> {
    let operation = Operation::from_method(method).ok_or_else(|| {
        error!("Request method {} has no mapping to api operation", method);
        DispatchError::UnsupportedMethod(method.to_string())
    })?;

    if !api.permits(operation) {
        debug!(
            "Operation {} not declared (declared: {})",
            operation,
            api.operations.codes()
        );
        return Err(DispatchError::NotFound);
    }

    Ok(operation)
}
