//! Error handling middleware - maps failures onto HTTP responses.

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use quire_core::error::{DomainError, RepoError};
use quire_core::validation::ValidationError;
use quire_shared::ErrorResponse;
use std::fmt;

/// Application-level error type.
///
/// Validation failures carry the structured validator output as the body;
/// a malformed id or a missing post answer with an empty body.
#[derive(Debug)]
pub enum AppError {
    NotFound,
    MalformedId(String),
    BadRequest(String),
    PayloadTooLarge(String),
    Validation(ValidationError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound => write!(f, "Not found"),
            AppError::MalformedId(id) => write!(f, "Malformed id: {:?}", id),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            AppError::Validation(err) => write!(f, "Validation error: {}", err),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::MalformedId(_) | AppError::BadRequest(_) | AppError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        match self {
            AppError::NotFound | AppError::MalformedId(_) => response.finish(),
            AppError::BadRequest(detail) => response.json(ErrorResponse::bad_request(detail)),
            AppError::PayloadTooLarge(detail) => {
                response.json(ErrorResponse::new(413, "Payload Too Large").with_detail(detail))
            }
            AppError::Validation(err) => response.json(err),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                response.json(ErrorResponse::internal_error(detail))
            }
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::MalformedId(id) => AppError::MalformedId(id),
            DomainError::Repo(err) => err.into(),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Body parse failures (bad JSON, wrong content type, oversized payload).
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    match err {
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            AppError::PayloadTooLarge(err.to_string()).into()
        }
        _ => AppError::BadRequest(err.to_string()).into(),
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
