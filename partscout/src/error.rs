use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PartscoutError {
    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Input the remote service cannot accept, e.g. an upload whose media
    /// type cannot be determined.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Remote AI error: {0}")]
    Remote(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for PartscoutError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            PartscoutError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            PartscoutError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            PartscoutError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            PartscoutError::Json(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            PartscoutError::Http(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            PartscoutError::Remote(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            PartscoutError::Database(_)
            | PartscoutError::Config(_)
            | PartscoutError::Io(_)
            | PartscoutError::Internal(_) => {
                tracing::error!(error = %self, "Internal error mapped to HTTP response");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, PartscoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let response = PartscoutError::NotFound("gone".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn remote_maps_to_bad_gateway() {
        let response = PartscoutError::Remote("quota".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn internal_errors_map_to_500() {
        let response = PartscoutError::Config("missing key".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
