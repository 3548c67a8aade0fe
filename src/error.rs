use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;

use crate::overtime::PeriodError;
use crate::store::StoreError;

/// Error type returned by every HTTP handler.
///
/// Renders as `{"message": ...}` with the matching status. Internal failures
/// are logged here and reported to the client without details.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<PeriodError> for ApiError {
    fn from(err: PeriodError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

/// MySQL reports every integrity violation, duplicate keys included, as SQLSTATE 23000.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23000"),
        _ => false,
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            ApiError::Database(e) if is_unique_violation(e) => StatusCode::CONFLICT,
            ApiError::Database(_) | ApiError::Store(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Request failed");
            "Internal Server Error".to_string()
        } else if let ApiError::Database(e) = self {
            tracing::debug!(error = %e, "Database rejected request");
            match status {
                StatusCode::CONFLICT => "Duplicate value".to_string(),
                _ => "Resource not found".to_string(),
            }
        } else {
            self.to_string()
        };

        HttpResponse::build(status).json(json!({ "message": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn status_codes() {
        let cases = [
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApiError::NotFound { entity: "Employee" }, StatusCode::NOT_FOUND),
            (ApiError::Conflict("x".into()), StatusCode::CONFLICT),
            (ApiError::Database(sqlx::Error::RowNotFound), StatusCode::NOT_FOUND),
            (ApiError::Database(sqlx::Error::PoolTimedOut), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status_code(), expected, "{err:?}");
        }
    }

    #[test]
    fn invalid_month_is_a_bad_request() {
        let err: ApiError = PeriodError::InvalidMonth("2023-13".into()).into();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn body_carries_message() {
        let resp = ApiError::NotFound { entity: "Employee" }.error_response();
        let body = to_bytes(resp.into_body()).await.unwrap();

        assert_eq!(body, r#"{"message":"Employee not found"}"#);
    }

    #[actix_web::test]
    async fn internal_details_are_hidden() {
        let resp = ApiError::Internal("connection string leaked".into()).error_response();
        let body = to_bytes(resp.into_body()).await.unwrap();

        assert_eq!(body, r#"{"message":"Internal Server Error"}"#);
    }
}
