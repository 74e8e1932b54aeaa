//! Shared error type across latscope crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Static dataset missing or malformed.
    DatasetLoad,
    /// Invalid input / malformed request.
    BadRequest,
    /// Payload too large.
    PayloadTooLarge,
    /// No such route.
    NotFound,
    /// Route exists, method does not.
    MethodNotAllowed,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::DatasetLoad => "DATASET_LOAD",
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, LatscopeError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum LatscopeError {
    #[error("dataset load failed: {0}")]
    DatasetLoad(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("payload too large")]
    PayloadTooLarge,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl LatscopeError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            LatscopeError::DatasetLoad(_) => ClientCode::DatasetLoad,
            LatscopeError::BadRequest(_) => ClientCode::BadRequest,
            LatscopeError::PayloadTooLarge => ClientCode::PayloadTooLarge,
            LatscopeError::NotFound(_) => ClientCode::NotFound,
            LatscopeError::MethodNotAllowed(_) => ClientCode::MethodNotAllowed,
            LatscopeError::Internal(_) => ClientCode::Internal,
        }
    }

    /// HTTP status shared by both adapters.
    pub fn http_status(&self) -> u16 {
        match self {
            LatscopeError::BadRequest(_) => 400,
            LatscopeError::NotFound(_) => 404,
            LatscopeError::MethodNotAllowed(_) => 405,
            LatscopeError::PayloadTooLarge => 413,
            LatscopeError::DatasetLoad(_) | LatscopeError::Internal(_) => 500,
        }
    }
}
