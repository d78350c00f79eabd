use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ideas_types::ErrorResponse;

use crate::db::DbError;
use crate::password::BcryptError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Conflict(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not Found", Some(msg)),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad Request", Some(msg)),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "Unauthorized", Some(msg)),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "Conflict", Some(msg)),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    Some("An unexpected error occurred".to_string()),
                )
            }
        };

        let error_response = ErrorResponse {
            error: message.to_string(),
            details,
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Conflict(constraint) => {
                ApiError::Conflict(format!("Record already exists ({})", constraint))
            }
            DbError::MissingReference(constraint) => {
                ApiError::BadRequest(format!("Referenced user does not exist ({})", constraint))
            }
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

impl From<BcryptError> for ApiError {
    fn from(err: BcryptError) -> Self {
        ApiError::InternalError(format!("Password hashing failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_errors_map_to_statuses() {
        let conflict: ApiError = DbError::Conflict("friends_pkey".to_string()).into();
        assert_eq!(conflict.into_response().status(), StatusCode::CONFLICT);

        let missing: ApiError = DbError::MissingReference("ideas_user_id_fkey".to_string()).into();
        assert_eq!(missing.into_response().status(), StatusCode::BAD_REQUEST);

        let outage: ApiError = DbError::Unavailable("down".to_string()).into();
        assert_eq!(outage.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let response = ApiError::InternalError("password=secret".to_string()).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(error.error, "Internal Server Error");
        assert_eq!(error.details.as_deref(), Some("An unexpected error occurred"));
    }
}
