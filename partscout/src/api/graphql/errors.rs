use async_graphql::{Enum, SimpleObject};

use crate::error::PartscoutError;

#[derive(Enum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum HardwareErrorCode {
    GraphqlError,
    Invalid,
    Required,
    NotFound,
}

/// A problem with a hardware mutation, reported alongside the payload.
#[derive(SimpleObject, Clone, Debug, PartialEq, Eq)]
pub struct HardwareError {
    /// Input field the error refers to, if any.
    pub field: Option<String>,
    pub message: String,
    pub code: HardwareErrorCode,
}

impl HardwareError {
    pub fn required(field: &str) -> Self {
        Self {
            field: Some(field.to_string()),
            message: "This field is required.".to_string(),
            code: HardwareErrorCode::Required,
        }
    }

    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.to_string()),
            message: message.into(),
            code: HardwareErrorCode::Invalid,
        }
    }

    pub fn from_error(field: Option<&str>, error: &PartscoutError) -> Self {
        let (code, message) = match error {
            PartscoutError::NotFound(msg) => (HardwareErrorCode::NotFound, msg.clone()),
            PartscoutError::Validation(msg) | PartscoutError::InvalidInput(msg) => {
                (HardwareErrorCode::Invalid, msg.clone())
            }
            PartscoutError::Http(_) | PartscoutError::Remote(_) | PartscoutError::Json(_) => {
                (HardwareErrorCode::GraphqlError, error.to_string())
            }
            PartscoutError::Database(_)
            | PartscoutError::Config(_)
            | PartscoutError::Io(_)
            | PartscoutError::Internal(_) => {
                tracing::error!(error = %error, "Hardware mutation failed");
                (
                    HardwareErrorCode::GraphqlError,
                    "An internal error occurred".to_string(),
                )
            }
        };

        Self {
            field: field.map(str::to_string),
            message,
            code,
        }
    }
}

/// Converts a store failure in a query resolver into a GraphQL error without
/// leaking database details.
pub fn query_error(error: PartscoutError) -> async_graphql::Error {
    match error {
        PartscoutError::NotFound(msg) => async_graphql::Error::new(msg),
        other => {
            tracing::error!(error = %other, "Hardware query failed");
            async_graphql::Error::new("An internal error occurred")
        }
    }
}
