use thiserror::Error;

/// Rejections produced before a query reaches the data executor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Unknown path, unmatched mount point, or an operation the resource does not declare
    #[error("Not Found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    /// An operation filter rejected the request
    #[error("{0}")]
    Validation(String),

    #[error("Invalid JSON payload: {0}")]
    InvalidPayload(String),

    /// The request verb has no operation mapping
    #[error("Request method {0} has no mapping to api operation")]
    UnsupportedMethod(String),
}

impl DispatchError {
    pub fn validation(message: impl Into<String>) -> Self {
        DispatchError::Validation(message.into())
    }
}
