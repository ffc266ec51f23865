// Error types for the colon router

use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ColonError {
    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ColonError {
    /// Status code a handler failure is answered with
    pub fn status_code(&self) -> StatusCode {
        match self {
            ColonError::RouteNotFound(_) | ColonError::NotFound(_) => StatusCode::NOT_FOUND,
            ColonError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ColonError::Deserialization(_) | ColonError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ColonError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ColonError::Forbidden(_) => StatusCode::FORBIDDEN,
            ColonError::Conflict(_) => StatusCode::CONFLICT,
            ColonError::UnsupportedMethod(_)
            | ColonError::Serialization(_)
            | ColonError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}
