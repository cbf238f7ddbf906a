use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SqlError {
    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Invalid column name: {0}")]
    InvalidColumn(String),

    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Payload must be a JSON object")]
    PayloadNotObject,

    #[error("Payload contains no declared fields")]
    EmptyPayload,

    #[error("Refusing to {0} without filters")]
    UnscopedMutation(&'static str),
}
