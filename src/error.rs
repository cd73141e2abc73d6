// error.rs
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

/// Caller-facing error taxonomy. Validation failures carry the status and
/// message the wire contract promises; storage failures map to a 500 and are
/// logged rather than leaked.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Poll not found")]
    NotFound,

    #[error("Option not found")]
    InvalidOption,

    #[error("Missing poll_id or option_index")]
    InvalidParams,

    #[error("Storage failure")]
    Storage(#[source] StoreError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound,
            StoreError::InvalidOption => ApiError::InvalidOption,
            other => ApiError::Storage(other),
        }
    }
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound => "not_found",
            ApiError::InvalidOption => "invalid_option",
            ApiError::InvalidParams => "invalid_params",
            ApiError::Storage(_) => "storage_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotFound | ApiError::InvalidOption => StatusCode::NOT_FOUND,
            ApiError::InvalidParams => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let ApiError::Storage(err) = &self {
            error!("storage failure: {err}");
        }

        let body = Json(json!({
            "code": self.code(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_their_api_variants() {
        assert!(matches!(
            ApiError::from(StoreError::NotFound),
            ApiError::NotFound
        ));
        assert!(matches!(
            ApiError::from(StoreError::InvalidOption),
            ApiError::InvalidOption
        ));
        assert!(matches!(
            ApiError::from(StoreError::Database(sqlx::Error::PoolClosed)),
            ApiError::Storage(_)
        ));
    }

    #[test]
    fn storage_failures_do_not_leak_details() {
        let err = ApiError::Storage(StoreError::Database(sqlx::Error::PoolClosed));
        assert_eq!(err.to_string(), "Storage failure");
    }
}
