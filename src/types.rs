/// Shared types used across the codebase

use std::fmt;

use axum::http::Method;
use serde::{Deserialize, Serialize};

/// Abstract operations a resource definition may permit.
/// Serialized as the single-letter codes used by specification documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "C")]
    Create,
    #[serde(rename = "R")]
    Read,
    #[serde(rename = "U")]
    Update,
    #[serde(rename = "D")]
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Create,
        Operation::Read,
        Operation::Update,
        Operation::Delete,
    ];

    /// Map a request verb onto an operation.
    /// POST creates, GET reads, PATCH updates, DELETE removes; anything else has no mapping.
    pub fn from_method(method: &Method) -> Option<Self> {
        match *method {
            Method::POST => Some(Operation::Create),
            Method::GET => Some(Operation::Read),
            Method::PATCH => Some(Operation::Update),
            Method::DELETE => Some(Operation::Delete),
            _ => None,
        }
    }

    pub fn code(&self) -> char {
        match self {
            Operation::Create => 'C',
            Operation::Read => 'R',
            Operation::Update => 'U',
            Operation::Delete => 'D',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'C' => Some(Operation::Create),
            'R' => Some(Operation::Read),
            'U' => Some(Operation::Update),
            'D' => Some(Operation::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
