use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtrack_database::RepositoryError;
use subtrack_models::{MonthParseError, SubscriptionValidationError};
use utoipa::ToSchema;

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Error kind, e.g. `Not found`
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    BadRequest(String),
    NotFound(String),
    DatabaseError(String),
    EncodingError(String),
    ValidationError(String),
    ParseError(String),
}

impl ServiceError {
    fn kind(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "Bad request",
            ServiceError::NotFound(_) => "Not found",
            ServiceError::DatabaseError(_) => "Database error",
            ServiceError::EncodingError(_) => "Encoding error",
            ServiceError::ValidationError(_) => "Validation error",
            ServiceError::ParseError(_) => "Parse error",
        }
    }

    fn message(&self) -> &str {
        match self {
            ServiceError::BadRequest(msg)
            | ServiceError::NotFound(msg)
            | ServiceError::DatabaseError(msg)
            | ServiceError::EncodingError(msg)
            | ServiceError::ValidationError(msg)
            | ServiceError::ParseError(msg) => msg,
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind(), self.message())
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::BadRequest(_)
            | ServiceError::ValidationError(_)
            | ServiceError::ParseError(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::DatabaseError(_)
            | ServiceError::EncodingError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.kind().to_string(),
            message: self.message().to_string(),
        })
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound("subscription not found".to_string()),
            RepositoryError::AlreadyExists(id) => {
                ServiceError::BadRequest(format!("subscription {} already exists", id))
            }
            RepositoryError::Database(e) => ServiceError::DatabaseError(e.to_string()),
        }
    }
}

impl From<SubscriptionValidationError> for ServiceError {
    fn from(err: SubscriptionValidationError) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl From<MonthParseError> for ServiceError {
    fn from(err: MonthParseError) -> Self {
        ServiceError::ParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ServiceError::ValidationError("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::ParseError("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ServiceError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ServiceError::DatabaseError("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ServiceError::EncodingError("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_body() {
        let resp = ServiceError::NotFound("subscription not found".into()).error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ServiceError::ParseError("bad".into()).to_string(),
            "Parse error: bad"
        );
    }

    #[test]
    fn test_repository_errors_map_to_kinds() {
        assert!(matches!(ServiceError::from(RepositoryError::NotFound), ServiceError::NotFound(_)));
        assert!(matches!(
            ServiceError::from(RepositoryError::Database(subtrack_database::sqlx::Error::PoolTimedOut)),
            ServiceError::DatabaseError(_)
        ));
    }
}
